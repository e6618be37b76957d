//! User Entity
//!
//! Profile data. Credentials live in [`super::auth::Auth`].

use chrono::{DateTime, Utc};
use kernel::id::UserId;

use crate::domain::value_object::{Email, UserRole, UserStatus, Username};

#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    /// Unique, case-insensitive
    pub username: Username,
    /// Unique; the address password resets are sent to
    pub email: Email,
    pub user_role: UserRole,
    pub user_status: UserStatus,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: Username, email: Email, user_role: UserRole) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            username,
            email,
            user_role,
            user_status: UserStatus::default(),
            first_name: None,
            last_name: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_names(mut self, first_name: Option<String>, last_name: Option<String>) -> Self {
        let clean = |s: Option<String>| s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        self.first_name = clean(first_name);
        self.last_name = clean(last_name);
        self
    }

    pub fn record_login(&mut self) {
        let now = Utc::now();
        self.last_login_at = Some(now);
        self.updated_at = now;
    }

    pub fn can_login(&self) -> bool {
        self.user_status.can_login()
    }

    pub fn set_status(&mut self, status: UserStatus) {
        self.user_status = status;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new(
            Username::new("jane").unwrap(),
            Email::new("jane@example.com").unwrap(),
            UserRole::Organizer,
        )
    }

    #[test]
    fn test_new_user_is_active() {
        let user = user();
        assert!(user.can_login());
        assert!(user.last_login_at.is_none());
    }

    #[test]
    fn test_disabled_user_cannot_login() {
        let mut user = user();
        user.set_status(UserStatus::Disabled);
        assert!(!user.can_login());
    }

    #[test]
    fn test_with_names_drops_blank() {
        let user = user().with_names(Some(" Jane ".into()), Some("  ".into()));
        assert_eq!(user.first_name.as_deref(), Some("Jane"));
        assert_eq!(user.last_name, None);
    }
}
