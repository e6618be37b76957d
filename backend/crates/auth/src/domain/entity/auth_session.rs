//! Auth Session Entity
//!
//! Server-side session. The cookie only carries a signed reference to
//! `session_id`.

use chrono::{DateTime, Duration, Utc};
use kernel::id::{SessionId, UserId};

use crate::domain::value_object::UserRole;

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub session_id: SessionId,
    pub user_id: UserId,
    /// Role at session creation
    pub user_role: UserRole,
    /// Unix timestamp ms
    pub expires_at_ms: i64,
    pub remember_me: bool,
    /// SHA-256 of the User-Agent the session was created with
    pub client_fingerprint_hash: Vec<u8>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl AuthSession {
    pub fn new(
        user_id: UserId,
        user_role: UserRole,
        remember_me: bool,
        fingerprint_hash: Vec<u8>,
        client_ip: Option<String>,
        user_agent: Option<String>,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();

        Self {
            session_id: SessionId::new(),
            user_id,
            user_role,
            expires_at_ms: (now + ttl).timestamp_millis(),
            remember_me,
            client_fingerprint_hash: fingerprint_hash,
            client_ip,
            user_agent,
            created_at: now,
            last_activity_at: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() > self.expires_at_ms
    }

    pub fn touch(&mut self) {
        self.last_activity_at = Utc::now();
    }

    /// Sliding expiry for remember-me sessions: once less than half of
    /// `ttl_long` remains, push expiry to `now + ttl_long`.
    pub fn extend_if_needed(&mut self, ttl_long: Duration) {
        if !self.remember_me {
            return;
        }

        let now = Utc::now();
        if self.expires_at_ms < (now + (ttl_long / 2)).timestamp_millis() {
            self.expires_at_ms = (now + ttl_long).timestamp_millis();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(remember_me: bool, ttl: Duration) -> AuthSession {
        AuthSession::new(
            UserId::new(),
            UserRole::Attendee,
            remember_me,
            vec![0u8; 32],
            None,
            None,
            ttl,
        )
    }

    #[test]
    fn test_expiry() {
        assert!(!session(false, Duration::hours(1)).is_expired());
        assert!(session(false, Duration::milliseconds(-1)).is_expired());
    }

    #[test]
    fn test_extend_only_remember_me() {
        let mut short = session(false, Duration::minutes(1));
        let before = short.expires_at_ms;
        short.extend_if_needed(Duration::days(7));
        assert_eq!(short.expires_at_ms, before);

        let mut long = session(true, Duration::minutes(1));
        long.extend_if_needed(Duration::days(7));
        assert!(long.expires_at_ms > before + Duration::days(6).num_milliseconds());
    }
}
