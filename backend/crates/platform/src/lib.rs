//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (HMAC-SHA256, Base64, random bytes)
//! - Password verification (Argon2id)
//! - Client identification (IP, User-Agent) and bearer token extraction
//! - Fixed-window rate limiting
//! - An injectable clock so expiry logic can be tested deterministically

pub mod bearer;
pub mod client;
pub mod clock;
pub mod crypto;
pub mod password;
pub mod rate_limit;
