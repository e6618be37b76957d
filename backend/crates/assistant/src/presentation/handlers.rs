//! HTTP Handlers

use axum::Json;
use axum::extract::State;

use crate::error::AssistantResult;
use crate::llm::LlmClient;
use crate::presentation::dto::{
    ChatRequest, ChatResponse, EnhanceDescriptionRequest, EnhanceDescriptionResponse,
    RecommendationsRequest, RecommendationsResponse, SearchSuggestionsRequest,
    SearchSuggestionsResponse, SentimentRequest,
};
use crate::service::{Assistant, Sentiment};

/// POST /api/ai/chat
pub async fn chat<C>(
    State(assistant): State<Assistant<C>>,
    Json(req): Json<ChatRequest>,
) -> AssistantResult<Json<ChatResponse>>
where
    C: LlmClient + Send + Sync + 'static,
{
    let reply = assistant
        .chat(&req.history, &req.message, req.language)
        .await?;
    Ok(Json(ChatResponse { reply }))
}

/// POST /api/ai/recommendations
pub async fn recommendations<C>(
    State(assistant): State<Assistant<C>>,
    Json(req): Json<RecommendationsRequest>,
) -> AssistantResult<Json<RecommendationsResponse>>
where
    C: LlmClient + Send + Sync + 'static,
{
    let event_ids = assistant
        .recommend_events(&req.preferences, &req.events)
        .await?;
    Ok(Json(RecommendationsResponse { event_ids }))
}

/// POST /api/ai/enhance-description
pub async fn enhance_description<C>(
    State(assistant): State<Assistant<C>>,
    Json(req): Json<EnhanceDescriptionRequest>,
) -> AssistantResult<Json<EnhanceDescriptionResponse>>
where
    C: LlmClient + Send + Sync + 'static,
{
    let description = assistant
        .enhance_description(&req.description, req.language)
        .await?;
    Ok(Json(EnhanceDescriptionResponse { description }))
}

/// POST /api/ai/sentiment
pub async fn sentiment<C>(
    State(assistant): State<Assistant<C>>,
    Json(req): Json<SentimentRequest>,
) -> AssistantResult<Json<Sentiment>>
where
    C: LlmClient + Send + Sync + 'static,
{
    Ok(Json(assistant.analyze_sentiment(&req.text).await?))
}

/// POST /api/ai/search-suggestions
pub async fn search_suggestions<C>(
    State(assistant): State<Assistant<C>>,
    Json(req): Json<SearchSuggestionsRequest>,
) -> AssistantResult<Json<SearchSuggestionsResponse>>
where
    C: LlmClient + Send + Sync + 'static,
{
    let suggestions = assistant.search_suggestions(&req.query).await?;
    Ok(Json(SearchSuggestionsResponse { suggestions }))
}
