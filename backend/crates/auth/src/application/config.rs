//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::fmt;
use std::time::Duration;

use platform::clock::duration_ms;
use platform::crypto::random_bytes;
use platform::password::{ClearTextPassword, HashedPassword, PasswordHashError};

use crate::domain::session::SessionPolicy;

/// Password accepted by [`AuthConfig::development`]
pub const DEV_ADMIN_PASSWORD: &str = "admin123";

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// Token signing secret for HMAC (32 bytes)
    pub token_secret: [u8; 32],
    /// Token lifetime (24 hours)
    pub token_ttl: Duration,
    /// Session inactivity limit (24 hours)
    pub session_idle_timeout: Duration,
    /// Distinct client IPs per session
    pub max_session_ips: usize,
    /// The admin credential
    pub admin_password: HashedPassword,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_secret", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .field("session_idle_timeout", &self.session_idle_timeout)
            .field("max_session_ips", &self.max_session_ips)
            .field("admin_password", &self.admin_password)
            .finish()
    }
}

impl AuthConfig {
    pub fn new(token_secret: [u8; 32], admin_password: HashedPassword) -> Self {
        Self {
            token_secret,
            token_ttl: Duration::from_secs(24 * 3600),
            session_idle_timeout: Duration::from_secs(24 * 3600),
            max_session_ips: 3,
            admin_password,
        }
    }

    /// Random 32-byte signing secret
    pub fn random_secret() -> [u8; 32] {
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&random_bytes(32));
        secret
    }

    /// Create config for development: random secret, [`DEV_ADMIN_PASSWORD`]
    pub fn development() -> Result<Self, PasswordHashError> {
        let password = ClearTextPassword::new(DEV_ADMIN_PASSWORD.to_owned())
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;
        Ok(Self::new(Self::random_secret(), password.hash()?))
    }

    pub fn token_ttl_secs(&self) -> i64 {
        self.token_ttl.as_secs() as i64
    }

    pub fn session_policy(&self) -> SessionPolicy {
        SessionPolicy {
            max_ips: self.max_session_ips,
            idle_timeout_ms: duration_ms(self.session_idle_timeout),
        }
    }
}
