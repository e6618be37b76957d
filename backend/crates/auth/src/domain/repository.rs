//! Repository Traits
//!
//! Persistence interfaces. Implementations live in `infra`.

use kernel::id::{SessionId, UserId};

use crate::domain::entity::{
    auth::Auth, auth_session::AuthSession, password_reset::PasswordReset, user::User,
};
use crate::domain::value_object::{Email, Username};
use crate::error::AuthResult;

#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a user. Fails with `UsernameTaken` / `EmailTaken` on conflicts.
    async fn create(&self, user: &User) -> AuthResult<()>;

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Case-insensitive lookup via the canonical username.
    async fn find_by_username(&self, username: &Username) -> AuthResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    async fn exists_by_username(&self, username: &Username) -> AuthResult<bool>;

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    async fn update(&self, user: &User) -> AuthResult<()>;
}

#[trait_variant::make(AuthRepository: Send)]
pub trait LocalAuthRepository {
    async fn create(&self, auth: &Auth) -> AuthResult<()>;

    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Option<Auth>>;

    async fn update(&self, auth: &Auth) -> AuthResult<()>;
}

#[trait_variant::make(AuthSessionRepository: Send)]
pub trait LocalAuthSessionRepository {
    async fn create(&self, session: &AuthSession) -> AuthResult<()>;

    /// Find an unexpired session. Fails with `SessionFingerprintMismatch`
    /// when the session exists but was created by a different client.
    async fn find_by_id(
        &self,
        session_id: SessionId,
        fingerprint_hash: &[u8],
    ) -> AuthResult<Option<AuthSession>>;

    /// Persist `last_activity_at` and `expires_at_ms`.
    async fn update(&self, session: &AuthSession) -> AuthResult<()>;

    async fn delete(&self, session_id: SessionId) -> AuthResult<()>;

    /// Delete every session of a user, optionally keeping one.
    async fn delete_all_for_user(
        &self,
        user_id: &UserId,
        except: Option<SessionId>,
    ) -> AuthResult<u64>;

    async fn cleanup_expired(&self) -> AuthResult<u64>;
}

#[trait_variant::make(PasswordResetRepository: Send)]
pub trait LocalPasswordResetRepository {
    /// Store a new request and mark the user's older live requests as
    /// consumed, so only the newest one can be used.
    async fn create_superseding(&self, reset: &PasswordReset) -> AuthResult<()>;

    /// Atomically consume the live request with this token hash.
    /// At most one caller ever receives `Some` for a given request.
    async fn consume_by_token_hash(
        &self,
        token_hash: &str,
        now_ms: i64,
    ) -> AuthResult<Option<PasswordReset>>;

    /// Atomically consume the newest live request for this email.
    async fn consume_latest_for_email(
        &self,
        email: &Email,
        now_ms: i64,
    ) -> AuthResult<Option<PasswordReset>>;

    /// Delete requests that expired or were consumed before `now_ms`.
    async fn purge_stale(&self, now_ms: i64) -> AuthResult<u64>;
}

/// Everything the HTTP layer needs from one storage backend.
pub trait AuthStore:
    UserRepository
    + AuthRepository
    + AuthSessionRepository
    + PasswordResetRepository
    + Send
    + Sync
    + 'static
{
}

impl<T> AuthStore for T where
    T: UserRepository
        + AuthRepository
        + AuthSessionRepository
        + PasswordResetRepository
        + Send
        + Sync
        + 'static
{
}
