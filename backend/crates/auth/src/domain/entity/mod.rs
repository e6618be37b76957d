pub mod auth;
pub mod auth_session;
pub mod password_reset;
pub mod user;
