//! Reset Password Use Case
//!
//! Step two, in two flavors:
//! - token: `reset-password` with the token from the mailed link
//! - direct: `reset-password-direct` with the email verified in step one
//!
//! The direct flavor never trusts the client's claim that the email was
//! verified: it must consume a live [`PasswordReset`] issued for that same
//! email. Both flavors consume the record atomically, so a request can be
//! redeemed once.
//!
//! After a reset every session of the user is revoked and lockout counters
//! are cleared.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::AuthConfig;
use crate::domain::entity::password_reset::PasswordReset;
use crate::domain::repository::{AuthRepository, AuthSessionRepository, PasswordResetRepository};
use crate::domain::value_object::{Email, RawPassword, ResetToken, UserPassword};
use crate::error::{AuthError, AuthResult};

pub struct ResetPasswordUseCase<A, S, P>
where
    A: AuthRepository,
    S: AuthSessionRepository,
    P: PasswordResetRepository,
{
    auth_repo: Arc<A>,
    session_repo: Arc<S>,
    reset_repo: Arc<P>,
    config: Arc<AuthConfig>,
}

impl<A, S, P> ResetPasswordUseCase<A, S, P>
where
    A: AuthRepository,
    S: AuthSessionRepository,
    P: PasswordResetRepository,
{
    pub fn new(
        auth_repo: Arc<A>,
        session_repo: Arc<S>,
        reset_repo: Arc<P>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            auth_repo,
            session_repo,
            reset_repo,
            config,
        }
    }

    pub async fn with_token(
        &self,
        token: &str,
        password: String,
        confirm_password: &str,
    ) -> AuthResult<()> {
        let token = ResetToken::from_client(token).ok_or(AuthError::InvalidResetRequest)?;
        let new_hash = self.hash_new_password(password, confirm_password)?;

        let reset = self
            .reset_repo
            .consume_by_token_hash(&token.hash(), Utc::now().timestamp_millis())
            .await?
            .ok_or(AuthError::InvalidResetRequest)?;

        self.apply(reset, new_hash, "token").await
    }

    pub async fn direct(
        &self,
        email: &str,
        password: String,
        confirm_password: &str,
    ) -> AuthResult<()> {
        let email = Email::new(email).map_err(|_| AuthError::InvalidResetRequest)?;
        let new_hash = self.hash_new_password(password, confirm_password)?;

        let reset = self
            .reset_repo
            .consume_latest_for_email(&email, Utc::now().timestamp_millis())
            .await?
            .ok_or(AuthError::InvalidResetRequest)?;

        self.apply(reset, new_hash, "direct").await
    }

    /// Validate and hash before consuming, so a rejected password does not
    /// burn the request.
    fn hash_new_password(&self, password: String, confirm: &str) -> AuthResult<UserPassword> {
        let raw = RawPassword::confirmed(password, confirm)?;
        UserPassword::from_raw(&raw, self.config.pepper())
    }

    async fn apply(
        &self,
        reset: PasswordReset,
        new_hash: UserPassword,
        flavor: &'static str,
    ) -> AuthResult<()> {
        let mut auth = self
            .auth_repo
            .find_by_user_id(&reset.user_id)
            .await?
            .ok_or_else(|| AuthError::Internal("Auth credentials missing for user".to_string()))?;

        auth.replace_password(new_hash);
        self.auth_repo.update(&auth).await?;

        let revoked = self
            .session_repo
            .delete_all_for_user(&reset.user_id, None)
            .await?;

        tracing::info!(
            user_id = %reset.user_id,
            reset_id = %reset.reset_id,
            flavor,
            sessions_revoked = revoked,
            "Password reset completed"
        );

        Ok(())
    }
}
