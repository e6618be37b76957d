//! Login, registration and logout

use std::sync::Arc;

use crate::api::AuthApi;
use crate::error::ClientError;
use crate::forms::{LoginForm, RegisterForm};
use crate::i18n::Message;
use crate::models::{LoginRequest, RegisterRequest};
use crate::session::SessionAccessor;
use crate::submit::{InFlight, Navigate, SubmitError, request_error};

pub struct LoginFlow<A> {
    session: SessionAccessor<A>,
    in_flight: InFlight,
}

impl<A: AuthApi> LoginFlow<A> {
    pub fn new(session: SessionAccessor<A>) -> Self {
        Self {
            session,
            in_flight: InFlight::new(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_pending()
    }

    /// Sign in, then land on `/admin` for admins and `/` for everyone else.
    ///
    /// The session is re-read after the login response, so the role used
    /// for the redirect is the one the server now reports.
    pub async fn submit(&self, form: LoginForm) -> Result<Navigate, SubmitError> {
        form.validate().map_err(SubmitError::Validation)?;

        let _guard = self.in_flight.try_begin()?;
        let req = LoginRequest {
            username: form.username.trim().to_string(),
            password: form.password,
            remember_me: form.remember_me,
        };

        self.session.api().login(&req).await.map_err(|e| {
            tracing::debug!(error = %e, "Login rejected");
            login_error(&e)
        })?;

        self.session.invalidate();
        let user = self.session.refetch().await.map_err(|e| {
            tracing::warn!(error = %e, "Session refresh after login failed");
            request_error(&e, Message::LoginFailed)
        })?;

        match user {
            Some(user) if user.role.is_admin() => Ok(Navigate::to("/admin")),
            Some(_) => Ok(Navigate::to("/")),
            // Cookie was not accepted
            None => Err(SubmitError::Request(Message::LoginFailed)),
        }
    }

    /// Always ends signed out locally, even when the request fails.
    pub async fn logout(&self) -> Navigate {
        if let Err(e) = self.session.api().logout().await {
            tracing::debug!(error = %e, "Logout request failed");
        }
        self.session.clear();
        Navigate::with_notice("/", Message::LogoutSuccess)
    }
}

fn login_error(err: &ClientError) -> SubmitError {
    match err.status() {
        Some(401) => SubmitError::Request(Message::InvalidCredentials),
        Some(423) => SubmitError::Request(Message::AccountLocked),
        Some(403) => SubmitError::Request(Message::AccountDisabled),
        _ => request_error(err, Message::LoginFailed),
    }
}

pub struct RegisterFlow<A> {
    api: Arc<A>,
    in_flight: InFlight,
}

impl<A: AuthApi> RegisterFlow<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            in_flight: InFlight::new(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_pending()
    }

    pub async fn submit(&self, form: RegisterForm) -> Result<Navigate, SubmitError> {
        let email = form.validate().map_err(SubmitError::Validation)?;

        let _guard = self.in_flight.try_begin()?;
        let req = RegisterRequest {
            username: form.username.trim().to_string(),
            email: email.as_str().to_string(),
            password: form.password,
            confirm_password: form.confirm_password,
            role: form.role,
            first_name: form.first_name,
            last_name: form.last_name,
        };

        match self.api.register(&req).await {
            Ok(()) => Ok(Navigate::with_notice("/login", Message::RegisterSuccess)),
            Err(e) if e.status() == Some(409) => Err(SubmitError::Request(Message::AccountExists)),
            Err(e) => {
                tracing::debug!(error = %e, "Registration rejected");
                Err(request_error(&e, Message::RegisterFailed))
            }
        }
    }
}
