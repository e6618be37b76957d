//! Assistant Configuration

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// Base URL of an OpenAI-compatible API (without `/chat/completions`)
    pub api_base: String,
    /// Bearer token; local servers often need none
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout: Duration,
    /// Prior chat turns forwarded to the model
    pub max_history: usize,
    /// Longest user input accepted, in characters
    pub max_input_chars: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 800,
            request_timeout: Duration::from_secs(30),
            max_history: 10,
            max_input_chars: 4000,
        }
    }
}

impl AssistantConfig {
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}
