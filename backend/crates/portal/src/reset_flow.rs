//! Forgot-password and reset-password flows
//!
//! [`ForgotPasswordFlow`] is a two-step state machine. The password step
//! carries the [`Email`] that the server accepted, so a password can only
//! be submitted for a verified address:
//!
//! ```text
//! Email --submit_email ok--> Password { email } --submit_password ok--> Completed
//!   ^                              |
//!   +--------- change_email -------+
//! ```
//!
//! [`TokenResetPage`] handles the mailed `/reset-password?token=...` link.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::api::AuthApi;
use crate::forms::{Email, EmailForm, PasswordForm, TokenResetForm};
use crate::i18n::Message;
use crate::models::{DirectResetRequest, ForgotPasswordRequest, TokenResetRequest};
use crate::submit::{InFlight, Navigate, SubmitError, request_error};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetStep {
    Email,
    Password { email: Email },
    Completed,
}

#[derive(Debug, Default)]
struct Fields {
    email: String,
    password: String,
    confirm_password: String,
}

pub struct ForgotPasswordFlow<A> {
    api: Arc<A>,
    step: Mutex<ResetStep>,
    fields: Mutex<Fields>,
    in_flight: InFlight,
}

impl<A: AuthApi> ForgotPasswordFlow<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            step: Mutex::new(ResetStep::Email),
            fields: Mutex::default(),
            in_flight: InFlight::new(),
        }
    }

    pub fn step(&self) -> ResetStep {
        self.step.lock().clone()
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_pending()
    }

    /// Hidden email field of the password form.
    pub fn verified_email(&self) -> Option<Email> {
        match &*self.step.lock() {
            ResetStep::Password { email } => Some(email.clone()),
            _ => None,
        }
    }

    /// Last entered (password, confirmation).
    pub fn password_fields(&self) -> (String, String) {
        let fields = self.fields.lock();
        (fields.password.clone(), fields.confirm_password.clone())
    }

    pub async fn submit_email(&self, input: &str) -> Result<(), SubmitError> {
        if *self.step.lock() != ResetStep::Email {
            return Err(SubmitError::WrongStep);
        }
        self.fields.lock().email = input.to_string();

        let form = EmailForm {
            email: input.to_string(),
        };
        let email = form.validate().map_err(SubmitError::Validation)?;

        let _guard = self.in_flight.try_begin()?;
        let req = ForgotPasswordRequest {
            email: email.as_str().to_string(),
        };

        match self.api.forgot_password(&req).await {
            Ok(()) => {
                tracing::debug!("Reset email accepted");
                *self.step.lock() = ResetStep::Password { email };
                Ok(())
            }
            Err(e) => {
                tracing::debug!(error = %e, "Forgot password rejected");
                // Unknown email, rate limit and server errors all look the same.
                Err(SubmitError::Request(Message::ForgotPasswordFailed))
            }
        }
    }

    /// Back to the email step; discards typed passwords.
    pub fn change_email(&self) -> Result<(), SubmitError> {
        let mut step = self.step.lock();
        if !matches!(*step, ResetStep::Password { .. }) {
            return Err(SubmitError::WrongStep);
        }
        *step = ResetStep::Email;

        let mut fields = self.fields.lock();
        fields.password.clear();
        fields.confirm_password.clear();
        Ok(())
    }

    pub async fn submit_password(
        &self,
        password: &str,
        confirm_password: &str,
    ) -> Result<Navigate, SubmitError> {
        let email = self.verified_email().ok_or(SubmitError::WrongStep)?;
        {
            let mut fields = self.fields.lock();
            fields.password = password.to_string();
            fields.confirm_password = confirm_password.to_string();
        }

        let form = PasswordForm {
            email,
            password: password.to_string(),
            confirm_password: confirm_password.to_string(),
        };
        form.validate().map_err(SubmitError::Validation)?;

        let _guard = self.in_flight.try_begin()?;
        let req = DirectResetRequest {
            email: form.email.as_str().to_string(),
            password: form.password,
            confirm_password: form.confirm_password,
        };

        match self.api.reset_password_direct(&req).await {
            Ok(()) => {
                *self.step.lock() = ResetStep::Completed;
                *self.fields.lock() = Fields::default();
                Ok(Navigate::with_notice("/login", Message::PasswordResetSuccess))
            }
            Err(e) => {
                tracing::debug!(error = %e, "Direct reset rejected");
                Err(request_error(&e, Message::ResetPasswordFailed))
            }
        }
    }
}

/// `/reset-password?token=...`
pub struct TokenResetPage<A> {
    api: Arc<A>,
    token: String,
    in_flight: InFlight,
}

impl<A: AuthApi> TokenResetPage<A> {
    /// Without a token the page is never shown; the caller is sent to
    /// `/login` with a notice instead.
    pub fn mount(api: Arc<A>, query: &str) -> Result<Self, Navigate> {
        let missing = Navigate::with_notice("/login", Message::ResetTokenMissing);

        let params: HashMap<String, String> =
            serde_urlencoded::from_str(query.trim_start_matches('?')).map_err(|_| missing)?;
        let token = params
            .get("token")
            .filter(|t| !t.trim().is_empty())
            .ok_or(missing)?;

        Ok(Self {
            api,
            token: token.clone(),
            in_flight: InFlight::new(),
        })
    }

    /// Hidden token field.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_pending()
    }

    pub async fn submit(
        &self,
        password: &str,
        confirm_password: &str,
    ) -> Result<Navigate, SubmitError> {
        let form = TokenResetForm {
            token: self.token.clone(),
            password: password.to_string(),
            confirm_password: confirm_password.to_string(),
        };
        form.validate().map_err(SubmitError::Validation)?;

        let _guard = self.in_flight.try_begin()?;
        let req = TokenResetRequest {
            token: form.token,
            password: form.password,
            confirm_password: form.confirm_password,
        };

        match self.api.reset_password(&req).await {
            Ok(()) => Ok(Navigate::with_notice("/login", Message::PasswordResetSuccess)),
            Err(e) => {
                tracing::debug!(error = %e, "Token reset rejected");
                Err(request_error(&e, Message::ResetPasswordFailed))
            }
        }
    }
}
