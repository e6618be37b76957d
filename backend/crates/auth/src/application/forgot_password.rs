//! Forgot Password Use Case
//!
//! Step one of both reset flavors: verify that the email belongs to an
//! active account, then issue a [`PasswordReset`] and mail its token link.
//! The live record is also what later authorizes the direct reset for the
//! same email.
//!
//! Every client-caused failure surfaces as `ResetRequestRejected`; the
//! specific reason is only logged.

use std::sync::Arc;

use platform::rate_limit::RateLimitStore;

use crate::application::config::AuthConfig;
use crate::domain::entity::password_reset::PasswordReset;
use crate::domain::mailer::{ResetMail, ResetMailer};
use crate::domain::repository::{PasswordResetRepository, UserRepository};
use crate::domain::value_object::Email;
use crate::error::{AuthError, AuthResult};

pub struct ForgotPasswordInput {
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    InvalidEmail,
    IpRateLimited,
    EmailRateLimited,
    UnknownEmail,
    AccountDisabled,
}

pub struct ForgotPasswordUseCase<U, P, M, L>
where
    U: UserRepository,
    P: PasswordResetRepository,
    M: ResetMailer,
    L: RateLimitStore,
{
    user_repo: Arc<U>,
    reset_repo: Arc<P>,
    mailer: Arc<M>,
    limiter: Arc<L>,
    config: Arc<AuthConfig>,
}

impl<U, P, M, L> ForgotPasswordUseCase<U, P, M, L>
where
    U: UserRepository,
    P: PasswordResetRepository,
    M: ResetMailer,
    L: RateLimitStore,
{
    pub fn new(
        user_repo: Arc<U>,
        reset_repo: Arc<P>,
        mailer: Arc<M>,
        limiter: Arc<L>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            reset_repo,
            mailer,
            limiter,
            config,
        }
    }

    /// `client_key` identifies the caller for per-IP limiting.
    pub async fn execute(&self, input: ForgotPasswordInput, client_key: &str) -> AuthResult<()> {
        match self.issue(input, client_key).await? {
            Ok(()) => Ok(()),
            Err(rejection) => {
                tracing::info!(reason = ?rejection, "Password reset request rejected");
                Err(AuthError::ResetRequestRejected)
            }
        }
    }

    async fn issue(
        &self,
        input: ForgotPasswordInput,
        client_key: &str,
    ) -> AuthResult<Result<(), Rejection>> {
        if !self
            .allow(&format!("forgot:ip:{client_key}"), &self.config.forgot_password_ip_limit)
            .await?
        {
            return Ok(Err(Rejection::IpRateLimited));
        }

        let Ok(email) = Email::new(input.email) else {
            return Ok(Err(Rejection::InvalidEmail));
        };

        if !self
            .allow(
                &format!("forgot:email:{}", email.as_str()),
                &self.config.forgot_password_email_limit,
            )
            .await?
        {
            return Ok(Err(Rejection::EmailRateLimited));
        }

        let Some(user) = self.user_repo.find_by_email(&email).await? else {
            return Ok(Err(Rejection::UnknownEmail));
        };
        if !user.can_login() {
            return Ok(Err(Rejection::AccountDisabled));
        }

        let ttl = chrono::Duration::from_std(self.config.reset_token_ttl)
            .map_err(|e| AuthError::Internal(format!("Invalid reset TTL: {e}")))?;
        let (reset, token) = PasswordReset::issue(user.user_id, email.clone(), ttl);
        self.reset_repo.create_superseding(&reset).await?;

        tracing::info!(
            user_id = %user.user_id,
            email = %email.masked(),
            reset_id = %reset.reset_id,
            "Password reset issued"
        );

        let mail = ResetMail {
            to: email,
            username: user.username.to_string(),
            link: self.config.reset_link(token.expose()),
            expires_in_minutes: self.config.reset_token_ttl.as_secs() / 60,
        };

        // The direct flavor works without the mail, so delivery problems
        // are logged and the request still succeeds.
        if let Err(e) = self.mailer.send_reset(&mail).await {
            tracing::error!(error = %e, reset_id = %reset.reset_id, "Reset mail not delivered");
        }

        Ok(Ok(()))
    }

    async fn allow(
        &self,
        key: &str,
        config: &platform::rate_limit::RateLimitConfig,
    ) -> AuthResult<bool> {
        self.limiter
            .check_and_increment(key, config)
            .await
            .map(|result| result.allowed)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }
}
