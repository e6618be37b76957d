//! Portal Configuration

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Origin of the API server, e.g. `http://localhost:31113`
    pub base_url: String,
    /// How long the "who am I" result counts as fresh (5 minutes)
    pub session_stale_time: Duration,
    pub request_timeout: Duration,
}

impl PortalConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_stale_time: Duration::from_secs(5 * 60),
            request_timeout: Duration::from_secs(15),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self::new("http://localhost:31113")
    }
}
