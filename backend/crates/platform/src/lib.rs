//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations for the backend crates:
//! - Cryptographic utilities (SHA-256, HMAC, Base64, random tokens)
//! - Password hashing (Argon2id) and strength policy
//! - Session cookie helpers
//! - Client fingerprinting
//! - Rate limiting

pub mod client;
pub mod cookie;
pub mod crypto;
pub mod password;
pub mod rate_limit;
