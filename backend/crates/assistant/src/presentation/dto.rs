//! API DTOs

use serde::{Deserialize, Serialize};

use crate::llm::ChatMessage;
use crate::service::{EventCandidate, Lang};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
    #[serde(default)]
    pub language: Lang,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationsRequest {
    #[serde(default)]
    pub preferences: String,
    pub events: Vec<EventCandidate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsResponse {
    pub event_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct EnhanceDescriptionRequest {
    pub description: String,
    #[serde(default)]
    pub language: Lang,
}

#[derive(Debug, Serialize)]
pub struct EnhanceDescriptionResponse {
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct SentimentRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchSuggestionsRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct SearchSuggestionsResponse {
    pub suggestions: Vec<String>,
}
