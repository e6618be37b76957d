//! Auth Router

use axum::{
    Router,
    routing::{get, post},
};

use crate::domain::mailer::ResetMailer;
use crate::domain::repository::AuthStore;
use crate::presentation::handlers::{self, AuthAppState};

/// Routes mounted under `/api/auth`.
pub fn auth_router<R, M>(state: AuthAppState<R, M>) -> Router
where
    R: AuthStore,
    M: ResetMailer + Send + Sync + 'static,
{
    Router::new()
        .route("/user", get(handlers::current_user::<R, M>))
        .route("/login", post(handlers::login::<R, M>))
        .route("/register", post(handlers::register::<R, M>))
        .route("/logout", post(handlers::logout::<R, M>))
        .route("/forgot-password", post(handlers::forgot_password::<R, M>))
        .route("/reset-password", post(handlers::reset_password::<R, M>))
        .route(
            "/reset-password-direct",
            post(handlers::reset_password_direct::<R, M>),
        )
        .with_state(state)
}
