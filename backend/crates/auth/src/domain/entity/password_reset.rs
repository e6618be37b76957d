//! Password Reset Entity
//!
//! One record backs both reset flavors. The token flavor consumes it by
//! token hash; the direct flavor consumes the newest live record for an
//! email. Either way a record is live until it expires or is consumed,
//! and consumption happens at most once.

use chrono::{DateTime, Duration, Utc};
use kernel::id::{PasswordResetId, UserId};

use crate::domain::value_object::{Email, ResetToken};

#[derive(Debug, Clone)]
pub struct PasswordReset {
    pub reset_id: PasswordResetId,
    pub user_id: UserId,
    pub email: Email,
    /// SHA-256 hex of the mailed token
    pub token_hash: String,
    pub expires_at_ms: i64,
    pub consumed_at_ms: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl PasswordReset {
    /// Issue a new request. The raw token is returned once and never stored.
    pub fn issue(user_id: UserId, email: Email, ttl: Duration) -> (Self, ResetToken) {
        let token = ResetToken::generate();
        let now = Utc::now();
        let reset = Self {
            reset_id: PasswordResetId::new(),
            user_id,
            email,
            token_hash: token.hash(),
            expires_at_ms: (now + ttl).timestamp_millis(),
            consumed_at_ms: None,
            created_at: now,
        };
        (reset, token)
    }

    pub fn is_live_at(&self, now_ms: i64) -> bool {
        self.consumed_at_ms.is_none() && self.expires_at_ms > now_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_stores_only_hash() {
        let (reset, token) = PasswordReset::issue(
            UserId::new(),
            Email::new("a@b.io").unwrap(),
            Duration::minutes(30),
        );
        assert_eq!(reset.token_hash, token.hash());
        assert_ne!(reset.token_hash, token.expose());
    }

    #[test]
    fn test_liveness() {
        let (mut reset, _) = PasswordReset::issue(
            UserId::new(),
            Email::new("a@b.io").unwrap(),
            Duration::minutes(30),
        );
        let now = Utc::now().timestamp_millis();
        assert!(reset.is_live_at(now));
        assert!(!reset.is_live_at(reset.expires_at_ms));

        reset.consumed_at_ms = Some(now);
        assert!(!reset.is_live_at(now));
    }
}
