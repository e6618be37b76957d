//! Auth Middleware
//!
//! Guards protected routes (the assistant API among them) with the same
//! session cookie the auth endpoints issue.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::application::CheckSessionUseCase;
use crate::application::config::AuthConfig;
use crate::domain::repository::AuthSessionRepository;
use crate::error::AuthError;
use crate::presentation::extract::{Client, SessionUser};

/// Middleware state
pub struct AuthMiddlewareState<R> {
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

impl<R> Clone for AuthMiddlewareState<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
        }
    }
}

/// Reject requests without a valid session; otherwise expose the caller as
/// a [`SessionUser`] extension.
pub async fn require_auth_session<R>(
    State(state): State<AuthMiddlewareState<R>>,
    req: Request<Body>,
    next: Next,
) -> Response
where
    R: AuthSessionRepository + Send + Sync + 'static,
{
    let (mut parts, body) = req.into_parts();
    let Ok(Client(client)) = Client::from_request_parts(&mut parts, &()).await;

    let token = platform::cookie::extract_cookie(&parts.headers, &state.config.session_cookie_name);

    let session = match token {
        Some(token) => {
            CheckSessionUseCase::new(state.repo.clone(), state.config.clone())
                .get_session(&token, &client.ua_hash)
                .await
        }
        None => Err(AuthError::SessionInvalid),
    };

    match session {
        Ok(session) => {
            parts.extensions.insert(SessionUser {
                user_id: session.user_id,
                session_id: session.session_id,
                role: session.user_role,
            });
            next.run(Request::from_parts(parts, body)).await
        }
        Err(e) => ([("X-Auth-Required", "true")], e.into_response()).into_response(),
    }
}
