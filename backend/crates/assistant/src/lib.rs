//! Assistant (LLM integration) Backend Module
//!
//! - `llm` - `LlmClient` port and the OpenAI-compatible HTTP client
//! - `service` - marketplace operations built on top of a completion
//! - `presentation` - DTOs, handlers and the `/api/ai` router
//!
//! The router carries no authentication of its own; the binary wraps it in
//! the auth crate's session middleware.

pub mod config;
pub mod error;
mod json;
pub mod llm;
pub mod presentation;
pub mod service;

pub use config::AssistantConfig;
pub use error::{AssistantError, AssistantResult};
pub use llm::{ChatMessage, ChatRole, LlmClient, OpenAiClient};
pub use presentation::router::assistant_router;
pub use service::{Assistant, EventCandidate, Lang, Sentiment};
