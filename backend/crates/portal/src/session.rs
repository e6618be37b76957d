//! Session accessor: the client's cached answer to "who am I"

use std::sync::Arc;

use serde_json::Value;

use crate::api::{AuthApi, USER_PATH};
use crate::error::ClientError;
use crate::models::User;
use crate::query_cache::{QueryCache, QueryKey, QueryOptions};

/// Snapshot consumed by the router and pages.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthState {
    pub user: Option<User>,
    pub is_loading: bool,
    pub is_authenticated: bool,
}

impl AuthState {
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            ..Self::default()
        }
    }

    pub fn resolved(user: Option<User>) -> Self {
        Self {
            is_authenticated: user.is_some(),
            user,
            is_loading: false,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.role.is_admin())
    }
}

pub struct SessionAccessor<A> {
    api: Arc<A>,
    cache: Arc<QueryCache>,
    options: QueryOptions,
    key: QueryKey,
}

impl<A> Clone for SessionAccessor<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            cache: Arc::clone(&self.cache),
            options: self.options,
            key: self.key.clone(),
        }
    }
}

impl<A: AuthApi> SessionAccessor<A> {
    pub fn new(api: Arc<A>, cache: Arc<QueryCache>, stale_time: std::time::Duration) -> Self {
        Self {
            api,
            cache,
            options: QueryOptions { stale_time },
            key: Self::query_key(),
        }
    }

    pub fn query_key() -> QueryKey {
        QueryKey::new([USER_PATH])
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    /// Current user, from cache while fresh. A 401 is `Ok(None)`.
    pub async fn get_current_user(&self) -> Result<Option<User>, ClientError> {
        let api = Arc::clone(&self.api);
        let value = self
            .cache
            .fetch_query(&self.key, self.options, || fetch_user(api))
            .await?;
        decode(value)
    }

    /// Fetch again regardless of freshness.
    pub async fn refetch(&self) -> Result<Option<User>, ClientError> {
        let api = Arc::clone(&self.api);
        let value = self
            .cache
            .refetch_query(&self.key, self.options, || fetch_user(api))
            .await?;
        decode(value)
    }

    pub fn invalidate(&self) {
        self.cache.invalidate(&self.key);
    }

    /// Mark signed out without a round trip.
    pub fn clear(&self) {
        self.cache.set_query_data(&self.key, Value::Null);
    }

    /// Loading until the first fetch has stored a value.
    pub fn state(&self) -> AuthState {
        match self.cache.get_query_data(&self.key) {
            None => AuthState::loading(),
            Some(value) => AuthState::resolved(decode(value).ok().flatten()),
        }
    }
}

async fn fetch_user<A: AuthApi>(api: Arc<A>) -> Result<Value, ClientError> {
    let user = api.current_user().await?;
    serde_json::to_value(user).map_err(|e| ClientError::Decode(e.to_string()))
}

fn decode(value: Value) -> Result<Option<User>, ClientError> {
    serde_json::from_value(value).map_err(|e| ClientError::Decode(e.to_string()))
}
