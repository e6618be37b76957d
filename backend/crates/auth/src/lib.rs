//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - PostgreSQL and in-memory repositories, reset mail transports
//! - `presentation/` - HTTP handlers, DTOs, router, session middleware
//!
//! ## Features
//! - Registration with a marketplace role (admin cannot be self-assigned)
//! - Login by username or email, server-side sessions with cookie tokens
//! - Two-step forgot/reset password: mailed token link or direct reset
//!   after the email was verified
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, optional pepper
//! - Session tokens HMAC-signed and bound to the client's User-Agent
//! - Lockout after 5 failed logins for 15 minutes
//! - Reset requests are single use, expire after 30 minutes, and revoke
//!   every session of the user when redeemed

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

pub use application::config::AuthConfig;
pub use domain::value_object::UserRole;
pub use error::{AuthError, AuthResult};
pub use infra::{InMemoryAuthRepository, Mailer, PgAuthRepository, SmtpConfig};
pub use presentation::{
    AuthAppState, AuthMiddlewareState, SessionUser, auth_router, require_auth_session,
};

pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
