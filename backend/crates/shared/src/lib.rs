//! Shared Kernel
//!
//! The small vocabulary every backend crate agrees on:
//! - [`error::app_error::AppError`] and [`error::kind::ErrorKind`]
//! - typed UUID identifiers ([`id::Id`])

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;

pub use error::app_error::{AppError, AppResult};
pub use error::kind::ErrorKind;
