//! Assistant Router

use axum::{Router, routing::post};

use crate::llm::LlmClient;
use crate::presentation::handlers;
use crate::service::Assistant;

/// Routes mounted under `/api/ai`.
pub fn assistant_router<C>(assistant: Assistant<C>) -> Router
where
    C: LlmClient + Send + Sync + 'static,
{
    Router::new()
        .route("/chat", post(handlers::chat::<C>))
        .route("/recommendations", post(handlers::recommendations::<C>))
        .route(
            "/enhance-description",
            post(handlers::enhance_description::<C>),
        )
        .route("/sentiment", post(handlers::sentiment::<C>))
        .route(
            "/search-suggestions",
            post(handlers::search_suggestions::<C>),
        )
        .with_state(assistant)
}
