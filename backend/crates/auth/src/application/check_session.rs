//! Check Session Use Case
//!
//! Resolves a session cookie to its session and, for `GET /user`, to the
//! signed-in user.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::session_token;
use crate::domain::entity::{auth_session::AuthSession, user::User};
use crate::domain::repository::{AuthSessionRepository, UserRepository};
use crate::error::{AuthError, AuthResult};

pub struct CheckSessionUseCase<S>
where
    S: AuthSessionRepository + Send + Sync + 'static,
{
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> CheckSessionUseCase<S>
where
    S: AuthSessionRepository + Send + Sync + 'static,
{
    pub fn new(session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            session_repo,
            config,
        }
    }

    /// Validate the token and return the live session.
    ///
    /// Activity and sliding expiry are written back in the background.
    pub async fn get_session(
        &self,
        session_token: &str,
        fingerprint_hash: &[u8],
    ) -> AuthResult<AuthSession> {
        let session_id = session_token::verify(&self.config.session_secret, session_token)?;

        let mut session = self
            .session_repo
            .find_by_id(session_id, fingerprint_hash)
            .await?
            .ok_or(AuthError::SessionInvalid)?;

        if session.is_expired() {
            self.session_repo.delete(session_id).await?;
            return Err(AuthError::SessionInvalid);
        }

        session.touch();
        let ttl_long = chrono::Duration::from_std(self.config.session_ttl_long)
            .map_err(|e| AuthError::Internal(format!("Invalid session TTL: {e}")))?;
        session.extend_if_needed(ttl_long);

        let session_clone = session.clone();
        let repo = self.session_repo.clone();
        tokio::spawn(async move {
            if let Err(e) = repo.update(&session_clone).await {
                tracing::warn!(error = %e, "Failed to update session activity");
            }
        });

        Ok(session)
    }

    pub async fn is_valid(&self, session_token: &str, fingerprint_hash: &[u8]) -> bool {
        self.get_session(session_token, fingerprint_hash)
            .await
            .is_ok()
    }
}

/// `GET /api/auth/user`: the user behind the current session.
pub struct CurrentUserUseCase<U, S>
where
    U: UserRepository,
    S: AuthSessionRepository + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    check: CheckSessionUseCase<S>,
}

impl<U, S> CurrentUserUseCase<U, S>
where
    U: UserRepository,
    S: AuthSessionRepository + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>, session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            check: CheckSessionUseCase::new(session_repo, config),
        }
    }

    /// A deleted or disabled account invalidates the session.
    pub async fn execute(&self, session_token: &str, fingerprint_hash: &[u8]) -> AuthResult<User> {
        let session = self.check.get_session(session_token, fingerprint_hash).await?;

        self.user_repo
            .find_by_id(&session.user_id)
            .await?
            .filter(User::can_login)
            .ok_or(AuthError::SessionInvalid)
    }
}
