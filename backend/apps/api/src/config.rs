//! Server configuration from the environment

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, bail};
use assistant::AssistantConfig;
use auth::{AuthConfig, SmtpConfig};
use base64::Engine;
use base64::engine::general_purpose;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31113";
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:5173,http://127.0.0.1:5173";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// In-memory storage when unset
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    pub auth: AuthConfig,
    /// Reset links are only logged when unset
    pub smtp: Option<SmtpConfig>,
    pub assistant: AssistantConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok(), cfg!(debug_assertions))
    }

    /// `development` allows a random session secret and insecure cookies.
    pub fn from_lookup<F>(lookup: F, development: bool) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = var("BIND_ADDR")
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
            .context("BIND_ADDR must be host:port")?;

        let frontend_origins = var("FRONTEND_ORIGINS")
            .as_deref()
            .unwrap_or(DEFAULT_FRONTEND_ORIGINS)
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        let mut auth = if development {
            AuthConfig::development()
        } else {
            AuthConfig::default()
        };

        match var("SESSION_SECRET") {
            Some(secret_b64) => auth.session_secret = decode_secret(&secret_b64)?,
            None if development => {
                tracing::warn!("SESSION_SECRET not set, using a random secret");
            }
            None => bail!("SESSION_SECRET must be set in production"),
        }

        auth.password_pepper = var("PASSWORD_PEPPER").map(String::into_bytes);

        if let Some(ttl) = var("RESET_TOKEN_TTL_SECS") {
            let secs: u64 = ttl.parse().context("RESET_TOKEN_TTL_SECS must be seconds")?;
            auth.reset_token_ttl = Duration::from_secs(secs);
        }
        if let Some(url) = var("RESET_BASE_URL") {
            auth.reset_base_url = url;
        }

        let smtp = match var("SMTP_HOST") {
            Some(host) => Some(SmtpConfig {
                host,
                port: var("SMTP_PORT")
                    .map(|p| p.parse::<u16>())
                    .transpose()
                    .context("SMTP_PORT must be a port number")?
                    .unwrap_or(587),
                username: var("SMTP_USERNAME").unwrap_or_default(),
                password: var("SMTP_PASSWORD").unwrap_or_default(),
                from: var("SMTP_FROM").context("SMTP_FROM is required with SMTP_HOST")?,
            }),
            None => None,
        };

        let mut assistant = AssistantConfig::default();
        if let Some(base) = var("LLM_API_BASE") {
            assistant.api_base = base;
        }
        assistant.api_key = var("LLM_API_KEY");
        if let Some(model) = var("LLM_MODEL") {
            assistant.model = model;
        }

        Ok(Self {
            database_url: var("DATABASE_URL"),
            bind_addr,
            frontend_origins,
            auth,
            smtp,
            assistant,
        })
    }
}

fn decode_secret(secret_b64: &str) -> anyhow::Result<[u8; 32]> {
    let bytes = general_purpose::STANDARD
        .decode(secret_b64.trim())
        .context("SESSION_SECRET must be base64")?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| anyhow::anyhow!("SESSION_SECRET must be 32 bytes, got {}", b.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)], development: bool) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned(), development)
    }

    #[test]
    fn test_development_defaults() {
        let config = config(&[], true).unwrap();
        assert_eq!(config.bind_addr.port(), 31113);
        assert_eq!(config.database_url, None);
        assert_eq!(config.frontend_origins.len(), 2);
        assert!(!config.auth.cookie_secure);
        assert_eq!(config.auth.reset_token_ttl, Duration::from_secs(1800));
        assert!(config.smtp.is_none());
        assert!(config.assistant.api_key.is_none());
    }

    #[test]
    fn test_production_requires_secret() {
        assert!(config(&[], false).is_err());

        let secret = general_purpose::STANDARD.encode([9u8; 32]);
        let config = config(&[("SESSION_SECRET", secret.as_str())], false).unwrap();
        assert_eq!(config.auth.session_secret, [9u8; 32]);
        assert!(config.auth.cookie_secure);
    }

    #[test]
    fn test_short_secret_is_rejected() {
        let secret = general_purpose::STANDARD.encode([1u8; 16]);
        let err = config(&[("SESSION_SECRET", secret.as_str())], true).unwrap_err();
        assert!(err.to_string().contains("32 bytes"));
    }

    #[test]
    fn test_overrides() {
        let config = config(
            &[
                ("DATABASE_URL", "postgres://localhost/events"),
                ("BIND_ADDR", "127.0.0.1:8080"),
                ("FRONTEND_ORIGINS", "https://events.example, "),
                ("PASSWORD_PEPPER", "pepper"),
                ("RESET_TOKEN_TTL_SECS", "600"),
                ("RESET_BASE_URL", "https://events.example/reset-password"),
                ("SMTP_HOST", "smtp.example"),
                ("SMTP_FROM", "Events <no-reply@events.example>"),
                ("LLM_API_BASE", "http://localhost:11434/v1"),
                ("LLM_MODEL", "llama3"),
            ],
            true,
        )
        .unwrap();

        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/events"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.frontend_origins, vec!["https://events.example"]);
        assert_eq!(config.auth.pepper(), Some(&b"pepper"[..]));
        assert_eq!(config.auth.reset_token_ttl, Duration::from_secs(600));
        assert_eq!(config.smtp.as_ref().unwrap().port, 587);
        assert_eq!(config.assistant.model, "llama3");
        assert_eq!(
            config.assistant.completions_url(),
            "http://localhost:11434/v1/chat/completions"
        );
    }

    #[test]
    fn test_smtp_requires_from() {
        assert!(config(&[("SMTP_HOST", "smtp.example")], true).is_err());
    }
}
