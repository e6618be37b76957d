//! User Password Value Objects
//!
//! Domain wrappers around `platform::password`. [`RawPassword`] is the
//! policy-checked input (zeroized on drop); [`UserPassword`] is the stored
//! Argon2id hash.

use platform::password::{ClearTextPassword, HashedPassword, PasswordPolicyError};
use std::fmt;

use crate::error::{AuthError, AuthResult};

pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// New password chosen by the user: must satisfy the strength policy.
    pub fn new(raw: String) -> AuthResult<Self> {
        ClearTextPassword::new(raw)
            .map(Self)
            .map_err(|e: PasswordPolicyError| AuthError::PasswordValidation(e.to_string()))
    }

    /// A new password together with its confirmation field.
    pub fn confirmed(password: String, confirm_password: &str) -> AuthResult<Self> {
        if password != confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        Self::new(password)
    }

    /// Login attempt: no policy, the stored hash decides.
    pub fn for_login(raw: String) -> Self {
        Self(ClearTextPassword::for_verification(raw))
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    pub fn from_raw(raw: &RawPassword, pepper: Option<&[u8]>) -> AuthResult<Self> {
        raw.0
            .hash(pepper)
            .map(Self)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Parse a PHC string read from the database.
    pub fn from_db(phc: impl Into<String>) -> AuthResult<Self> {
        HashedPassword::from_phc_string(phc)
            .map(Self)
            .map_err(|e| AuthError::Internal(format!("Stored password hash unreadable: {e}")))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_phc_string()
    }

    pub fn verify(&self, raw: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.0.verify(&raw.0, pepper)
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UserPassword").field(&"[HASH]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmed_rejects_mismatch_before_policy() {
        let err = RawPassword::confirmed("short".into(), "other").unwrap_err();
        assert!(matches!(err, AuthError::PasswordMismatch));
    }

    #[test]
    fn test_policy_error_is_validation() {
        let err = RawPassword::new("lettersonly".into()).unwrap_err();
        assert!(matches!(err, AuthError::PasswordValidation(_)));
    }

    #[test]
    fn test_hash_verify_and_reload() {
        let raw = RawPassword::confirmed("Abc12345".into(), "Abc12345").unwrap();
        let stored = UserPassword::from_raw(&raw, Some(b"pepper")).unwrap();

        let reloaded = UserPassword::from_db(stored.as_str()).unwrap();
        assert!(reloaded.verify(&RawPassword::for_login("Abc12345".into()), Some(b"pepper")));
        assert!(!reloaded.verify(&RawPassword::for_login("Abc12346".into()), Some(b"pepper")));
    }

    #[test]
    fn test_from_db_rejects_garbage() {
        assert!(UserPassword::from_db("plaintext").is_err());
    }
}
