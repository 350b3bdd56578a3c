//! Shield Configuration

use std::time::Duration;

use platform::client::DEFAULT_TRUSTED_PROXY_HOPS;
use platform::clock::duration_ms;
use platform::rate_limit::RateLimitConfig;

/// Origins accepted by CORS in production when none are configured
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "https://her-liberation.onrender.com",
    "https://herliberation.com",
    "https://www.herliberation.com",
    "https://her-liberation.org",
    "https://www.her-liberation.org",
];

/// IP reputation tuning
#[derive(Debug, Clone)]
pub struct ReputationConfig {
    /// Failure weight at which an IP becomes blocked
    pub block_threshold: u32,
    /// Block lifetime, counted from the last recorded failure
    pub block_duration: Duration,
    /// Weight of one failed admin login
    pub failed_login_penalty: u32,
    /// Weight of one injection attempt
    pub attack_penalty: u32,
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            block_threshold: 5,
            block_duration: Duration::from_secs(60 * 60),
            failed_login_penalty: 1,
            attack_penalty: 10,
        }
    }
}

impl ReputationConfig {
    pub fn block_duration_ms(&self) -> i64 {
        duration_ms(self.block_duration)
    }
}

/// Shield configuration
#[derive(Debug, Clone)]
pub struct ShieldConfig {
    /// Production mode: strict CORS allow-list
    pub production: bool,
    /// CORS allow-list used in production
    pub allowed_origins: Vec<String>,
    /// Largest JSON or form body accepted
    pub max_body_bytes: usize,
    /// Reverse proxies whose `X-Forwarded-For` entries are trusted
    pub trusted_proxy_hops: usize,
    /// All `/api/` traffic, per IP
    pub general_limit: RateLimitConfig,
    /// Public write routes, per IP and path
    pub mutation_limit: RateLimitConfig,
    /// Login, per IP
    pub sensitive_limit: RateLimitConfig,
    /// How long an `X-Request-ID` is remembered
    pub replay_window: Duration,
    pub reputation: ReputationConfig,
}

impl Default for ShieldConfig {
    fn default() -> Self {
        Self {
            production: true,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_body_bytes: 5 * 1024 * 1024,
            trusted_proxy_hops: DEFAULT_TRUSTED_PROXY_HOPS,
            general_limit: RateLimitConfig::new(100, 15 * 60),
            mutation_limit: RateLimitConfig::new(10, 60),
            sensitive_limit: RateLimitConfig::new(5, 60 * 60),
            replay_window: Duration::from_secs(5 * 60),
            reputation: ReputationConfig::default(),
        }
    }
}

impl ShieldConfig {
    /// Development: any origin is accepted
    pub fn development() -> Self {
        Self {
            production: false,
            ..Default::default()
        }
    }

    pub fn replay_window_ms(&self) -> i64 {
        duration_ms(self.replay_window)
    }
}
