//! In-Memory Repository
//!
//! Process-local implementation of every auth repository trait. Used when no
//! `DATABASE_URL` is configured and by the handler tests. A single mutex
//! guards all tables, which also makes reset consumption atomic.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use kernel::id::{PasswordResetId, SessionId, UserId};
use parking_lot::Mutex;

use crate::domain::entity::{
    auth::Auth, auth_session::AuthSession, password_reset::PasswordReset, user::User,
};
use crate::domain::repository::{
    AuthRepository, AuthSessionRepository, PasswordResetRepository, UserRepository,
};
use crate::domain::value_object::{Email, Username};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    auths: HashMap<UserId, Auth>,
    sessions: HashMap<SessionId, AuthSession>,
    resets: HashMap<PasswordResetId, PasswordReset>,
}

#[derive(Clone, Default)]
pub struct InMemoryAuthRepository {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_count(&self) -> usize {
        self.tables.lock().sessions.len()
    }

    fn consume_where(
        &self,
        now_ms: i64,
        matches: impl Fn(&PasswordReset) -> bool,
    ) -> Option<PasswordReset> {
        let mut tables = self.tables.lock();
        let reset = tables
            .resets
            .values_mut()
            .filter(|r| r.is_live_at(now_ms) && matches(&**r))
            .max_by_key(|r| r.created_at)?;
        reset.consumed_at_ms = Some(now_ms);
        Some(reset.clone())
    }
}

impl UserRepository for InMemoryAuthRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut tables = self.tables.lock();
        if tables
            .users
            .values()
            .any(|u| u.username.canonical() == user.username.canonical())
        {
            return Err(AuthError::UsernameTaken);
        }
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(AuthError::EmailTaken);
        }
        tables.users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.tables.lock().users.get(user_id).cloned())
    }

    async fn find_by_username(&self, username: &Username) -> AuthResult<Option<User>> {
        Ok(self
            .tables
            .lock()
            .users
            .values()
            .find(|u| u.username.canonical() == username.canonical())
            .cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        Ok(self
            .tables
            .lock()
            .users
            .values()
            .find(|u| &u.email == email)
            .cloned())
    }

    async fn exists_by_username(&self, username: &Username) -> AuthResult<bool> {
        Ok(UserRepository::find_by_username(self, username).await?.is_some())
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        Ok(UserRepository::find_by_email(self, email).await?.is_some())
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        self.tables.lock().users.insert(user.user_id, user.clone());
        Ok(())
    }
}

impl AuthRepository for InMemoryAuthRepository {
    async fn create(&self, auth: &Auth) -> AuthResult<()> {
        self.tables.lock().auths.insert(auth.user_id, auth.clone());
        Ok(())
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Option<Auth>> {
        Ok(self.tables.lock().auths.get(user_id).cloned())
    }

    async fn update(&self, auth: &Auth) -> AuthResult<()> {
        self.tables.lock().auths.insert(auth.user_id, auth.clone());
        Ok(())
    }
}

impl AuthSessionRepository for InMemoryAuthRepository {
    async fn create(&self, session: &AuthSession) -> AuthResult<()> {
        self.tables
            .lock()
            .sessions
            .insert(session.session_id, session.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        session_id: SessionId,
        fingerprint_hash: &[u8],
    ) -> AuthResult<Option<AuthSession>> {
        let tables = self.tables.lock();
        match tables.sessions.get(&session_id) {
            Some(s) if s.is_expired() => Ok(None),
            Some(s) if s.client_fingerprint_hash != fingerprint_hash => {
                Err(AuthError::SessionFingerprintMismatch)
            }
            Some(s) => Ok(Some(s.clone())),
            None => Ok(None),
        }
    }

    async fn update(&self, session: &AuthSession) -> AuthResult<()> {
        if let Some(stored) = self.tables.lock().sessions.get_mut(&session.session_id) {
            stored.expires_at_ms = session.expires_at_ms;
            stored.last_activity_at = session.last_activity_at;
        }
        Ok(())
    }

    async fn delete(&self, session_id: SessionId) -> AuthResult<()> {
        self.tables.lock().sessions.remove(&session_id);
        Ok(())
    }

    async fn delete_all_for_user(
        &self,
        user_id: &UserId,
        except: Option<SessionId>,
    ) -> AuthResult<u64> {
        let mut tables = self.tables.lock();
        let before = tables.sessions.len();
        tables
            .sessions
            .retain(|id, s| s.user_id != *user_id || Some(*id) == except);
        Ok((before - tables.sessions.len()) as u64)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let mut tables = self.tables.lock();
        let before = tables.sessions.len();
        tables.sessions.retain(|_, s| !s.is_expired());
        Ok((before - tables.sessions.len()) as u64)
    }
}

impl PasswordResetRepository for InMemoryAuthRepository {
    async fn create_superseding(&self, reset: &PasswordReset) -> AuthResult<()> {
        let now_ms = Utc::now().timestamp_millis();
        let mut tables = self.tables.lock();
        for older in tables
            .resets
            .values_mut()
            .filter(|r| r.user_id == reset.user_id && r.consumed_at_ms.is_none())
        {
            older.consumed_at_ms = Some(now_ms);
        }
        tables.resets.insert(reset.reset_id, reset.clone());
        Ok(())
    }

    async fn consume_by_token_hash(
        &self,
        token_hash: &str,
        now_ms: i64,
    ) -> AuthResult<Option<PasswordReset>> {
        Ok(self.consume_where(now_ms, |r| r.token_hash == token_hash))
    }

    async fn consume_latest_for_email(
        &self,
        email: &Email,
        now_ms: i64,
    ) -> AuthResult<Option<PasswordReset>> {
        Ok(self.consume_where(now_ms, |r| &r.email == email))
    }

    async fn purge_stale(&self, now_ms: i64) -> AuthResult<u64> {
        let mut tables = self.tables.lock();
        let before = tables.resets.len();
        tables.resets.retain(|_, r| r.is_live_at(now_ms));
        Ok((before - tables.resets.len()) as u64)
    }
}
