use serde::{Deserialize, Serialize};
use std::fmt;

/// Marketplace role. Every user has exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum UserRole {
    Admin = 0,
    Organizer = 1,
    #[default]
    Attendee = 2,
    Sponsor = 3,
    ServiceProvider = 4,
    VenueOwner = 5,
}

impl UserRole {
    pub const ALL: [UserRole; 6] = [
        UserRole::Admin,
        UserRole::Organizer,
        UserRole::Attendee,
        UserRole::Sponsor,
        UserRole::ServiceProvider,
        UserRole::VenueOwner,
    ];

    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        use UserRole::*;
        match self {
            Admin => "admin",
            Organizer => "organizer",
            Attendee => "attendee",
            Sponsor => "sponsor",
            ServiceProvider => "service_provider",
            VenueOwner => "venue_owner",
        }
    }

    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    /// Roles a visitor may pick on the registration form.
    #[inline]
    pub const fn is_self_assignable(&self) -> bool {
        !self.is_admin()
    }

    pub fn from_id(id: i16) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.id() == id)
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.code() == code)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_id_roundtrip() {
        for role in UserRole::ALL {
            assert_eq!(UserRole::from_id(role.id()), Some(role));
        }
        assert_eq!(UserRole::from_id(42), None);
    }

    #[test]
    fn test_user_role_from_code() {
        assert_eq!(UserRole::from_code("admin"), Some(UserRole::Admin));
        assert_eq!(
            UserRole::from_code("service_provider"),
            Some(UserRole::ServiceProvider)
        );
        assert_eq!(UserRole::from_code("venue_owner"), Some(UserRole::VenueOwner));
        assert_eq!(UserRole::from_code("super_admin"), None);
    }

    #[test]
    fn test_user_role_serde_matches_code() {
        for role in UserRole::ALL {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.code()));
        }
    }

    #[test]
    fn test_default_and_self_assignment() {
        assert_eq!(UserRole::default(), UserRole::Attendee);
        assert!(!UserRole::Admin.is_self_assignable());
        assert!(UserRole::Organizer.is_self_assignable());
    }
}
