//! Session cookie token: `<session uuid>.<base64url(HMAC-SHA256(uuid))>`.

use kernel::id::SessionId;
use platform::crypto::{from_base64url, hmac_sha256, hmac_sha256_verify, to_base64url};

use crate::error::{AuthError, AuthResult};

pub fn sign(secret: &[u8], session_id: &SessionId) -> String {
    let id = session_id.to_string();
    let signature = hmac_sha256(secret, id.as_bytes());
    format!("{}.{}", id, to_base64url(&signature))
}

/// Verify the signature and return the session id it references.
pub fn verify(secret: &[u8], token: &str) -> AuthResult<SessionId> {
    let (id, signature_b64) = token.split_once('.').ok_or(AuthError::SessionInvalid)?;

    let signature = from_base64url(signature_b64).map_err(|_| AuthError::SessionInvalid)?;
    if !hmac_sha256_verify(secret, id.as_bytes(), &signature) {
        return Err(AuthError::SessionInvalid);
    }

    id.parse().map_err(|_| AuthError::SessionInvalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = &[42u8; 32];

    #[test]
    fn test_sign_then_verify() {
        let id = SessionId::new();
        let token = sign(SECRET, &id);
        assert!(token.starts_with(&id.to_string()));
        assert_eq!(verify(SECRET, &token).unwrap(), id);
    }

    #[test]
    fn test_rejects_tampering() {
        let token = sign(SECRET, &SessionId::new());
        let forged = format!("{}.{}", SessionId::new(), token.split_once('.').unwrap().1);

        assert!(verify(SECRET, &forged).is_err());
        assert!(verify(&[1u8; 32], &token).is_err());
        assert!(verify(SECRET, "no-dot").is_err());
        assert!(verify(SECRET, "abc.!!!").is_err());
    }
}
