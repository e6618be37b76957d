//! LLM Client
//!
//! The service only needs "messages in, text out". [`OpenAiClient`] speaks
//! the `/chat/completions` dialect that OpenAI, Ollama and most hosted
//! gateways accept.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::AssistantConfig;
use crate::error::{AssistantError, AssistantResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

#[trait_variant::make(LlmClient: Send)]
pub trait LocalLlmClient {
    /// Text of the first completion choice.
    async fn complete(&self, messages: &[ChatMessage]) -> AssistantResult<String>;
}

// ============================================================================
// OpenAI-compatible client
// ============================================================================

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiClient {
    pub fn new(config: &AssistantConfig) -> AssistantResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AssistantError::Upstream(format!("HTTP client setup failed: {e}")))?;

        Ok(Self {
            client,
            url: config.completions_url(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

impl LlmClient for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage]) -> AssistantResult<String> {
        let body = CompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AssistantError::Upstream(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let parsed = response
                    .json::<CompletionResponse>()
                    .await
                    .map_err(|e| AssistantError::InvalidModelOutput(e.to_string()))?;

                let content = parsed
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.message.content)
                    .filter(|content| !content.trim().is_empty())
                    .ok_or_else(|| {
                        AssistantError::InvalidModelOutput("empty completion".to_string())
                    })?;

                tracing::debug!(model = %self.model, chars = content.len(), "Completion received");
                Ok(content)
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(AssistantError::UpstreamStatus {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}
