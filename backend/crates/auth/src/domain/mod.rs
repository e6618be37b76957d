//! Domain Layer
//!
//! Entities, value objects, and repository traits.

pub mod entity;
pub mod mailer;
pub mod repository;
pub mod value_object;

pub use entity::{
    auth::Auth, auth_session::AuthSession, password_reset::PasswordReset, user::User,
};
pub use mailer::{ResetMail, ResetMailer};
pub use repository::{
    AuthRepository, AuthSessionRepository, AuthStore, PasswordResetRepository, UserRepository,
};
