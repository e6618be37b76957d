//! Application Layer
//!
//! Use cases and application services.

pub mod check_session;
pub mod config;
pub mod forgot_password;
pub mod reset_password;
pub mod session_token;
pub mod sign_in;
pub mod sign_out;
pub mod sign_up;

pub use check_session::{CheckSessionUseCase, CurrentUserUseCase};
pub use config::AuthConfig;
pub use forgot_password::{ForgotPasswordInput, ForgotPasswordUseCase};
pub use reset_password::ResetPasswordUseCase;
pub use sign_in::{ClientFingerprint, SignInInput, SignInOutput, SignInUseCase};
pub use sign_out::SignOutUseCase;
pub use sign_up::{SignUpInput, SignUpOutput, SignUpUseCase};
