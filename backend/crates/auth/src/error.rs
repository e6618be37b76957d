//! Auth Error Types
//!
//! Auth-specific variants, rendered through `kernel::AppError` as RFC 7807
//! problem JSON.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username is already taken")]
    UsernameTaken,

    #[error("Email is already registered")]
    EmailTaken,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Account is temporarily locked")]
    AccountLocked,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Session not found or expired")]
    SessionInvalid,

    #[error("Session fingerprint mismatch")]
    SessionFingerprintMismatch,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    PasswordValidation(String),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("This role cannot be chosen at registration")]
    RoleNotAllowed,

    /// Forgot-password failed. Unknown email, rate limit and disabled
    /// account all map here so the response does not reveal whether an
    /// account exists.
    #[error("We could not verify that email address. Please check it and try again.")]
    ResetRequestRejected,

    /// Reset token or verified email is unknown, expired or already used.
    #[error("This password reset request is invalid or has expired")]
    InvalidResetRequest,

    #[error("Mail delivery failed: {0}")]
    Mail(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::UsernameTaken | AuthError::EmailTaken => ErrorKind::Conflict,
            AuthError::InvalidCredentials
            | AuthError::SessionInvalid
            | AuthError::SessionFingerprintMismatch => ErrorKind::Unauthorized,
            AuthError::AccountLocked => ErrorKind::Locked,
            AuthError::AccountDisabled | AuthError::RoleNotAllowed => ErrorKind::Forbidden,
            AuthError::Validation(_)
            | AuthError::PasswordValidation(_)
            | AuthError::PasswordMismatch
            | AuthError::ResetRequestRejected
            | AuthError::InvalidResetRequest => ErrorKind::BadRequest,
            AuthError::Mail(_) | AuthError::Database(_) | AuthError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    pub fn to_app_error(&self) -> AppError {
        let err = match self {
            // Never leak driver or mailer details to clients.
            AuthError::Mail(_) | AuthError::Database(_) | AuthError::Internal(_) => {
                AppError::new(self.kind(), "Internal server error")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        };

        match self {
            AuthError::AccountLocked => err.with_action("Try again in 15 minutes"),
            AuthError::InvalidResetRequest => err.with_action("Request a new password reset"),
            _ => err,
        }
    }

    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::Mail(msg) => {
                tracing::error!(message = %msg, "Reset mail delivery failed");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::AccountLocked => {
                tracing::warn!("Login attempt on locked account");
            }
            AuthError::SessionFingerprintMismatch => {
                tracing::warn!("Session fingerprint mismatch detected");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        let err = self.to_app_error();
        match self {
            AuthError::Database(e) => err.with_source(e),
            _ => err,
        }
        .into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest | ErrorKind::UnprocessableEntity => {
                AuthError::Validation(err.message().to_string())
            }
            _ => AuthError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AuthError::InvalidCredentials.to_app_error().status_code(), 401);
        assert_eq!(AuthError::AccountLocked.to_app_error().status_code(), 423);
        assert_eq!(AuthError::AccountDisabled.to_app_error().status_code(), 403);
        assert_eq!(AuthError::EmailTaken.to_app_error().status_code(), 409);
        assert_eq!(AuthError::ResetRequestRejected.to_app_error().status_code(), 400);
        assert_eq!(AuthError::InvalidResetRequest.to_app_error().status_code(), 400);
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = AuthError::Internal("pool exhausted at 10.0.0.3".into()).to_app_error();
        assert_eq!(err.status_code(), 500);
        assert!(!err.message().contains("10.0.0.3"));
    }

    #[test]
    fn test_validation_app_error_maps_to_validation() {
        let err: AuthError = AppError::bad_request("Invalid email format").into();
        assert!(matches!(err, AuthError::Validation(ref m) if m == "Invalid email format"));
    }
}
