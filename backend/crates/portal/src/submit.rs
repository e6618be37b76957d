//! Shared submit plumbing for the auth forms

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

use crate::error::ClientError;
use crate::forms::FieldErrors;
use crate::i18n::Message;

/// Where the page should go next, with an optional notice to show there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigate {
    pub to: &'static str,
    pub notice: Option<Message>,
}

impl Navigate {
    pub const fn to(to: &'static str) -> Self {
        Self { to, notice: None }
    }

    pub const fn with_notice(to: &'static str, notice: Message) -> Self {
        Self {
            to,
            notice: Some(notice),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Form has invalid fields")]
    Validation(FieldErrors),

    #[error("Request failed: {}", .0.key())]
    Request(Message),

    #[error("A submission is already in progress")]
    Pending,

    #[error("Submit is not available in the current step")]
    WrongStep,
}

impl SubmitError {
    /// Banner text key, when the error is not tied to a field.
    pub fn message(&self) -> Option<Message> {
        match self {
            SubmitError::Validation(_) | SubmitError::WrongStep => None,
            SubmitError::Request(message) => Some(*message),
            SubmitError::Pending => Some(Message::RequestPending),
        }
    }
}

/// Network failures get their own message; everything else gets `fallback`.
pub(crate) fn request_error(err: &ClientError, fallback: Message) -> SubmitError {
    match err {
        ClientError::Network(_) => SubmitError::Request(Message::NetworkError),
        _ => SubmitError::Request(fallback),
    }
}

/// At most one submission per form at a time.
#[derive(Debug, Clone, Default)]
pub struct InFlight(Arc<AtomicBool>);

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drives the submit button's disabled state.
    pub fn is_pending(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn try_begin(&self) -> Result<InFlightGuard, SubmitError> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| InFlightGuard(Arc::clone(&self.0)))
            .map_err(|_| SubmitError::Pending)
    }
}

/// Clears the pending flag on drop.
#[derive(Debug)]
pub struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
