//! Password reset token.
//!
//! 32 random bytes, base64url encoded, handed to the user once by mail.
//! Only the SHA-256 hex digest is stored.

use platform::crypto::{random_token, sha256_hex};
use std::fmt;

const TOKEN_BYTES: usize = 32;

pub struct ResetToken(String);

impl ResetToken {
    pub fn generate() -> Self {
        Self(random_token(TOKEN_BYTES))
    }

    /// Wrap a token received from a client. Returns `None` for blank input.
    pub fn from_client(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        (!raw.is_empty()).then(|| Self(raw.to_string()))
    }

    pub fn hash(&self) -> String {
        sha256_hex(self.0.as_bytes())
    }

    /// The raw token, for building the emailed link only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ResetToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ResetToken").field(&"[REDACTED]").finish()
    }
}
