//! Sign In Use Case
//!
//! Authenticates a user and creates a session.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::session_token;
use crate::domain::entity::{auth_session::AuthSession, user::User};
use crate::domain::repository::{AuthRepository, AuthSessionRepository, UserRepository};
use crate::domain::value_object::{Email, RawPassword, UserRole, Username};
use crate::error::{AuthError, AuthResult};

pub use platform::client::ClientFingerprint;

pub struct SignInInput {
    /// Username or email
    pub identifier: String,
    pub password: String,
    pub remember_me: bool,
}

pub struct SignInOutput {
    /// Signed value for the session cookie
    pub session_token: String,
    pub user_id: String,
    pub user_role: UserRole,
    pub remember_me: bool,
}

pub struct SignInUseCase<U, A, S>
where
    U: UserRepository,
    A: AuthRepository,
    S: AuthSessionRepository,
{
    user_repo: Arc<U>,
    auth_repo: Arc<A>,
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<U, A, S> SignInUseCase<U, A, S>
where
    U: UserRepository,
    A: AuthRepository,
    S: AuthSessionRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        auth_repo: Arc<A>,
        session_repo: Arc<S>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            auth_repo,
            session_repo,
            config,
        }
    }

    pub async fn execute(
        &self,
        input: SignInInput,
        fingerprint: ClientFingerprint,
    ) -> AuthResult<SignInOutput> {
        if input.identifier.trim().is_empty() || input.password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .find_user(&input.identifier)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.can_login() {
            return Err(AuthError::AccountDisabled);
        }

        let mut auth = self
            .auth_repo
            .find_by_user_id(&user.user_id)
            .await?
            .ok_or_else(|| AuthError::Internal("Auth credentials missing for user".to_string()))?;

        if auth.is_locked() {
            return Err(AuthError::AccountLocked);
        }

        let raw_password = RawPassword::for_login(input.password);
        if !auth.password_hash.verify(&raw_password, self.config.pepper()) {
            auth.record_failure();
            self.auth_repo.update(&auth).await?;
            return Err(AuthError::InvalidCredentials);
        }

        auth.reset_failures();
        self.auth_repo.update(&auth).await?;

        let mut user = user;
        user.record_login();
        self.user_repo.update(&user).await?;

        let ttl = chrono::Duration::from_std(self.config.session_ttl(input.remember_me))
            .map_err(|e| AuthError::Internal(format!("Invalid session TTL: {e}")))?;

        let session = AuthSession::new(
            user.user_id,
            user.user_role,
            input.remember_me,
            fingerprint.ua_hash.to_vec(),
            fingerprint.ip_string(),
            fingerprint.user_agent.clone(),
            ttl,
        );
        self.session_repo.create(&session).await?;

        tracing::info!(
            user_id = %user.user_id,
            session_id = %session.session_id,
            remember_me = input.remember_me,
            "User signed in"
        );

        Ok(SignInOutput {
            session_token: session_token::sign(&self.config.session_secret, &session.session_id),
            user_id: user.user_id.to_string(),
            user_role: user.user_role,
            remember_me: input.remember_me,
        })
    }

    /// Identifiers containing `@` are looked up as email, others as username.
    /// Malformed identifiers are simply unknown users.
    async fn find_user(&self, identifier: &str) -> AuthResult<Option<User>> {
        if identifier.contains('@') {
            match Email::new(identifier) {
                Ok(email) => self.user_repo.find_by_email(&email).await,
                Err(_) => Ok(None),
            }
        } else {
            match Username::new(identifier) {
                Ok(username) => self.user_repo.find_by_username(&username).await,
                // Reserved names can still belong to seeded accounts.
                Err(_) => {
                    self.user_repo
                        .find_by_username(&Username::from_db(identifier.trim()))
                        .await
                }
            }
        }
    }
}
