//! Request extractors

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use platform::client::ClientFingerprint;

use crate::error::AuthError;

/// Caller fingerprint. The socket address is used when the server was
/// started with connect info, headers otherwise.
pub struct Client(pub ClientFingerprint);

impl<S> FromRequestParts<S> for Client
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let direct_ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        Ok(Client(ClientFingerprint::from_headers(
            &parts.headers,
            direct_ip,
        )))
    }
}

/// Authenticated caller, inserted by `require_auth_session`.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user_id: kernel::id::UserId,
    pub session_id: kernel::id::SessionId,
    pub role: crate::domain::value_object::UserRole,
}

impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionUser>()
            .cloned()
            .ok_or(AuthError::SessionInvalid)
    }
}
