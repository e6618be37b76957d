//! Rate Limiting
//!
//! Fixed-window counters behind the [`RateLimitStore`] trait. The in-memory
//! store is enough for a single API instance; a shared store can implement
//! the same trait.

use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    pub fn window_ms(&self) -> i64 {
        self.window.as_millis() as i64
    }
}

/// Rate limit check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at_ms: i64,
}

#[derive(Debug, thiserror::Error)]
#[error("rate limit store unavailable: {0}")]
pub struct RateLimitError(pub String);

/// Trait for rate limit storage backends
#[trait_variant::make(RateLimitStore: Send)]
pub trait LocalRateLimitStore {
    /// Count one hit against `key` and report whether it is within budget.
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitError>;
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at_ms: i64,
    count: u32,
}

/// Process-local fixed-window limiter.
#[derive(Debug, Default)]
pub struct InMemoryRateLimiter {
    windows: Mutex<HashMap<String, Window>>,
}

impl InMemoryRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same as [`RateLimitStore::check_and_increment`] with an explicit clock.
    pub fn check_at(&self, key: &str, config: &RateLimitConfig, now_ms: i64) -> RateLimitResult {
        let mut windows = self.windows.lock();
        let window = windows.entry(key.to_string()).or_insert(Window {
            started_at_ms: now_ms,
            count: 0,
        });

        if now_ms - window.started_at_ms >= config.window_ms() {
            *window = Window {
                started_at_ms: now_ms,
                count: 0,
            };
        }

        let reset_at_ms = window.started_at_ms + config.window_ms();
        if window.count >= config.max_requests {
            return RateLimitResult {
                allowed: false,
                remaining: 0,
                reset_at_ms,
            };
        }

        window.count += 1;
        RateLimitResult {
            allowed: true,
            remaining: config.max_requests - window.count,
            reset_at_ms,
        }
    }

    /// Drop windows that ended before `now_ms`.
    pub fn purge_expired(&self, config: &RateLimitConfig, now_ms: i64) {
        self.windows
            .lock()
            .retain(|_, w| now_ms - w.started_at_ms < config.window_ms());
    }
}

impl RateLimitStore for InMemoryRateLimiter {
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitError> {
        Ok(self.check_at(key, config, now_ms()))
    }
}

pub(crate) fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_up_to_limit() {
        let limiter = InMemoryRateLimiter::new();
        let config = RateLimitConfig::new(3, 60);

        let results: Vec<_> = (0..4)
            .map(|_| limiter.check_at("email:a@b.c", &config, 1_000))
            .collect();

        assert_eq!(
            results.iter().map(|r| r.allowed).collect::<Vec<_>>(),
            vec![true, true, true, false]
        );
        assert_eq!(results[0].remaining, 2);
        assert_eq!(results[3].remaining, 0);
        assert_eq!(results[3].reset_at_ms, 61_000);
    }

    #[test]
    fn test_window_resets() {
        let limiter = InMemoryRateLimiter::new();
        let config = RateLimitConfig::new(1, 60);

        assert!(limiter.check_at("k", &config, 0).allowed);
        assert!(!limiter.check_at("k", &config, 59_999).allowed);
        assert!(limiter.check_at("k", &config, 60_000).allowed);
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = InMemoryRateLimiter::new();
        let config = RateLimitConfig::new(1, 60);

        assert!(limiter.check_at("ip:1", &config, 0).allowed);
        assert!(limiter.check_at("ip:2", &config, 0).allowed);
        assert!(!limiter.check_at("ip:1", &config, 0).allowed);
    }

    #[test]
    fn test_purge_expired() {
        let limiter = InMemoryRateLimiter::new();
        let config = RateLimitConfig::new(1, 60);
        limiter.check_at("old", &config, 0);
        limiter.check_at("new", &config, 50_000);

        limiter.purge_expired(&config, 70_000);
        assert_eq!(limiter.windows.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_store_trait() {
        let limiter = InMemoryRateLimiter::new();
        let config = RateLimitConfig::new(2, 900);
        let first = RateLimitStore::check_and_increment(&limiter, "k", &config)
            .await
            .unwrap();
        assert!(first.allowed);
        assert_eq!(first.remaining, 1);
    }
}
