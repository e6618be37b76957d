//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use platform::cookie::CookieConfig;
use platform::rate_limit::RateLimitConfig;

pub use platform::cookie::SameSite;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub session_cookie_name: String,
    /// HMAC key for session tokens (32 bytes)
    pub session_secret: [u8; 32],
    /// Session TTL without "Remember Me" (12 hours)
    pub session_ttl_short: Duration,
    /// Session TTL with "Remember Me" (1 week)
    pub session_ttl_long: Duration,
    pub cookie_secure: bool,
    pub cookie_same_site: SameSite,
    /// Application-wide secret appended before hashing
    pub password_pepper: Option<Vec<u8>>,
    /// Lifetime of a password reset request (30 minutes)
    pub reset_token_ttl: Duration,
    /// Front-end page that receives `?token=...`
    pub reset_base_url: String,
    /// Forgot-password budget per email address
    pub forgot_password_email_limit: RateLimitConfig,
    /// Forgot-password budget per client IP
    pub forgot_password_ip_limit: RateLimitConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "session".to_string(),
            session_secret: [0u8; 32],
            session_ttl_short: Duration::from_secs(12 * 3600),
            session_ttl_long: Duration::from_secs(7 * 24 * 3600),
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            password_pepper: None,
            reset_token_ttl: Duration::from_secs(30 * 60),
            reset_base_url: "http://localhost:5173/reset-password".to_string(),
            forgot_password_email_limit: RateLimitConfig::new(3, 15 * 60),
            forgot_password_ip_limit: RateLimitConfig::new(10, 15 * 60),
        }
    }
}

impl AuthConfig {
    /// Config with a random session secret (for development)
    pub fn with_random_secret() -> Self {
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&platform::crypto::random_bytes(32));
        Self {
            session_secret: secret,
            ..Default::default()
        }
    }

    /// Development config (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    pub fn cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.session_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
        }
    }

    pub fn session_ttl(&self, remember_me: bool) -> Duration {
        if remember_me {
            self.session_ttl_long
        } else {
            self.session_ttl_short
        }
    }

    /// Link mailed for the token flavor of the reset.
    pub fn reset_link(&self, token: &str) -> String {
        let sep = if self.reset_base_url.contains('?') { '&' } else { '?' };
        format!("{}{}token={}", self.reset_base_url, sep, token)
    }
}
