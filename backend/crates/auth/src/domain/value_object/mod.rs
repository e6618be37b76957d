//! Value Object Module

pub mod email;
pub mod reset_token;
pub mod user_password;
pub mod user_role;
pub mod user_status;
pub mod username;

pub use email::Email;
pub use reset_token::ResetToken;
pub use user_password::{RawPassword, UserPassword};
pub use user_role::UserRole;
pub use user_status::UserStatus;
pub use username::Username;
