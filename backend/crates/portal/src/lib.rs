//! Portal client core
//!
//! The browser-side half of the marketplace's authentication, expressed
//! without any rendering:
//! - [`i18n`]: English/Arabic message catalog
//! - [`api`]: cookie-carrying HTTP client for `/api/auth/*`
//! - [`query_cache`]: keyed cache with single-flight fetches
//! - [`session`]: the cached "who am I" read and [`session::AuthState`]
//! - [`router`]: path + session to view or redirect
//! - [`reset_flow`] / [`login_flow`]: form state machines

pub mod api;
pub mod config;
pub mod error;
pub mod forms;
pub mod i18n;
pub mod login_flow;
pub mod models;
pub mod query_cache;
pub mod reset_flow;
pub mod router;
pub mod session;
pub mod submit;

pub use api::{ApiClient, AuthApi, HttpAuthApi, UnauthorizedBehavior};
pub use config::PortalConfig;
pub use error::ClientError;
pub use i18n::{Language, Message, t};
pub use login_flow::{LoginFlow, RegisterFlow};
pub use models::{Role, User};
pub use query_cache::{QueryCache, QueryKey};
pub use reset_flow::{ForgotPasswordFlow, ResetStep, TokenResetPage};
pub use router::{Resolution, View, resolve};
pub use session::{AuthState, SessionAccessor};
pub use submit::{Navigate, SubmitError};

use std::sync::Arc;

/// Wire a session accessor to the HTTP API with a fresh cache.
pub fn connect(config: PortalConfig) -> Result<SessionAccessor<HttpAuthApi>, ClientError> {
    let stale_time = config.session_stale_time;
    let api = HttpAuthApi::new(ApiClient::new(config)?);
    Ok(SessionAccessor::new(
        Arc::new(api),
        Arc::new(QueryCache::new()),
        stale_time,
    ))
}
