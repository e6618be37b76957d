//! Assistant Error Types

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

pub type AssistantResult<T> = Result<T, AssistantError>;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Model request failed: {0}")]
    Upstream(String),

    #[error("Model API returned {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    /// The completion did not contain the JSON shape that was asked for.
    #[error("Unusable model output: {0}")]
    InvalidModelOutput(String),
}

impl AssistantError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AssistantError::InvalidInput(_) => ErrorKind::BadRequest,
            AssistantError::UpstreamStatus { status: 429, .. } => ErrorKind::ServiceUnavailable,
            AssistantError::Upstream(_)
            | AssistantError::UpstreamStatus { .. }
            | AssistantError::InvalidModelOutput(_) => ErrorKind::BadGateway,
        }
    }

    pub fn to_app_error(&self) -> AppError {
        match self {
            AssistantError::InvalidInput(msg) => AppError::new(self.kind(), msg.clone()),
            // Upstream details stay in the logs
            _ => AppError::new(self.kind(), "The assistant is unavailable right now")
                .with_action("Try again in a moment"),
        }
    }

    fn log(&self) {
        match self {
            AssistantError::InvalidInput(msg) => {
                tracing::debug!(message = %msg, "Assistant input rejected");
            }
            AssistantError::InvalidModelOutput(msg) => {
                tracing::warn!(message = %msg, "Unusable model output");
            }
            _ => {
                tracing::error!(error = %self, "Model request failed");
            }
        }
    }
}

impl IntoResponse for AssistantError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}
