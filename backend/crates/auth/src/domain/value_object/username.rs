//! Username Value Object
//!
//! The login handle. ASCII only (`a-z 0-9 _ . -`), 3 to 30 characters,
//! case-insensitive for uniqueness: `original` keeps the user's casing for
//! display and `canonical` (lowercase) is what the store compares.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

pub const USERNAME_MIN_LENGTH: usize = 3;
pub const USERNAME_MAX_LENGTH: usize = 30;

const ALLOWED_SPECIAL_CHARS: &[char] = &['_', '.', '-'];

/// Handles that would collide with routes or impersonate staff.
const RESERVED_WORDS: &[&str] = &[
    "admin",
    "administrator",
    "root",
    "system",
    "support",
    "staff",
    "moderator",
    "api",
    "auth",
    "login",
    "logout",
    "register",
    "password",
    "reset",
    "events",
    "services",
    "venues",
    "profile",
    "assistant",
    "dashboard",
    "null",
    "undefined",
    "anonymous",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsernameError {
    #[error("Username cannot be empty")]
    Empty,

    #[error("Username is too short ({length} chars, minimum {min})")]
    TooShort { length: usize, min: usize },

    #[error("Username is too long ({length} chars, maximum {max})")]
    TooLong { length: usize, max: usize },

    #[error("Invalid character '{char}' in username. Only a-z, 0-9, _, . and - are allowed")]
    InvalidCharacter { char: char },

    #[error("Username must start and end with a letter, digit or underscore")]
    InvalidBoundary,

    #[error("Username cannot contain consecutive dots")]
    ConsecutiveDots,

    #[error("'{0}' is a reserved username")]
    Reserved(String),
}

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username {
    original: String,
    canonical: String,
}

impl Username {
    pub fn new(input: impl AsRef<str>) -> Result<Self, UsernameError> {
        let original: String = input.as_ref().nfkc().collect::<String>().trim().to_string();
        let canonical = original.to_lowercase();
        Self::validate(&canonical)?;
        Ok(Self {
            original,
            canonical,
        })
    }

    /// Rebuild from a stored value (validated on the way in).
    pub fn from_db(original: impl Into<String>) -> Self {
        let original = original.into();
        let canonical = original.to_lowercase();
        Self {
            original,
            canonical,
        }
    }

    #[inline]
    pub fn original(&self) -> &str {
        &self.original
    }

    #[inline]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    fn validate(canonical: &str) -> Result<(), UsernameError> {
        if canonical.is_empty() {
            return Err(UsernameError::Empty);
        }

        let length = canonical.chars().count();
        if length < USERNAME_MIN_LENGTH {
            return Err(UsernameError::TooShort {
                length,
                min: USERNAME_MIN_LENGTH,
            });
        }
        if length > USERNAME_MAX_LENGTH {
            return Err(UsernameError::TooLong {
                length,
                max: USERNAME_MAX_LENGTH,
            });
        }

        if let Some(char) = canonical
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || ALLOWED_SPECIAL_CHARS.contains(c)))
        {
            return Err(UsernameError::InvalidCharacter { char });
        }

        let boundary_ok =
            |c: Option<char>| c.is_some_and(|c| c.is_ascii_alphanumeric() || c == '_');
        if !boundary_ok(canonical.chars().next()) || !boundary_ok(canonical.chars().last()) {
            return Err(UsernameError::InvalidBoundary);
        }

        if canonical.contains("..") {
            return Err(UsernameError::ConsecutiveDots);
        }

        if RESERVED_WORDS.contains(&canonical) {
            return Err(UsernameError::Reserved(canonical.to_string()));
        }

        Ok(())
    }
}

impl TryFrom<String> for Username {
    type Error = UsernameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.original
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl fmt::Debug for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Username({})", self.original)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_usernames() {
        for name in ["jane", "Jane_Doe", "event.planner", "venue-owner_1", "_abc"] {
            assert!(Username::new(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn test_canonical_is_lowercase() {
        let name = Username::new("  JaneDoe ").unwrap();
        assert_eq!(name.original(), "JaneDoe");
        assert_eq!(name.canonical(), "janedoe");
        assert_eq!(name.to_string(), "JaneDoe");
    }

    #[test]
    fn test_fullwidth_input_is_normalized() {
        let name = Username::new("ｊａｎｅ").unwrap();
        assert_eq!(name.canonical(), "jane");
    }

    #[test]
    fn test_invalid_usernames() {
        assert_eq!(Username::new("   "), Err(UsernameError::Empty));
        assert!(matches!(
            Username::new("ab"),
            Err(UsernameError::TooShort { .. })
        ));
        assert!(matches!(
            Username::new("a".repeat(31)),
            Err(UsernameError::TooLong { .. })
        ));
        assert!(matches!(
            Username::new("jane doe"),
            Err(UsernameError::InvalidCharacter { char: ' ' })
        ));
        assert!(matches!(
            Username::new("مستخدم"),
            Err(UsernameError::InvalidCharacter { .. })
        ));
        assert_eq!(Username::new(".jane"), Err(UsernameError::InvalidBoundary));
        assert_eq!(Username::new("jane-"), Err(UsernameError::InvalidBoundary));
        assert_eq!(Username::new("ja..ne"), Err(UsernameError::ConsecutiveDots));
    }

    #[test]
    fn test_reserved_usernames() {
        assert_eq!(
            Username::new("Admin"),
            Err(UsernameError::Reserved("admin".to_string()))
        );
        assert!(Username::new("admin_jane").is_ok());
    }
}
