//! Auth Entity
//!
//! Credentials and login-failure bookkeeping, kept apart from the profile.

use chrono::{DateTime, Utc};
use kernel::id::UserId;

use crate::domain::value_object::UserPassword;

#[derive(Debug, Clone)]
pub struct Auth {
    pub user_id: UserId,
    pub password_hash: UserPassword,
    /// Consecutive login failures
    pub login_failed_count: u16,
    pub last_failed_at: Option<DateTime<Utc>>,
    /// Temporary lockout after too many failures
    pub locked_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Auth {
    /// Maximum login failures before temporary lockout
    pub const MAX_LOGIN_FAILURES: u16 = 5;
    /// Lockout duration in minutes
    pub const LOCKOUT_MINUTES: i64 = 15;

    pub fn new(user_id: UserId, password_hash: UserPassword) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            password_hash,
            login_failed_count: 0,
            last_failed_at: None,
            locked_until: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked_until.is_some_and(|until| Utc::now() < until)
    }

    pub fn record_failure(&mut self) {
        let now = Utc::now();
        self.login_failed_count = self.login_failed_count.saturating_add(1);
        self.last_failed_at = Some(now);
        self.updated_at = now;

        if self.login_failed_count >= Self::MAX_LOGIN_FAILURES {
            self.locked_until = Some(now + chrono::Duration::minutes(Self::LOCKOUT_MINUTES));
        }
    }

    pub fn reset_failures(&mut self) {
        self.login_failed_count = 0;
        self.last_failed_at = None;
        self.locked_until = None;
        self.updated_at = Utc::now();
    }

    /// Replace the password. A reset also lifts any lockout.
    pub fn replace_password(&mut self, new_password: UserPassword) {
        self.password_hash = new_password;
        self.reset_failures();
    }
}
