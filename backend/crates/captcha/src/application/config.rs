//! Application Configuration
//!
//! Configuration for the captcha application layer.

use std::time::Duration;

use platform::clock::duration_ms;

/// Captcha application configuration
#[derive(Debug, Clone)]
pub struct CaptchaConfig {
    /// How long an issued captcha stays redeemable
    pub ttl: Duration,
    /// Smallest operand
    pub operand_min: i64,
    /// Largest operand
    pub operand_max: i64,
}

impl Default for CaptchaConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(5 * 60),
            operand_min: 1,
            operand_max: 10,
        }
    }
}

impl CaptchaConfig {
    pub fn ttl_ms(&self) -> i64 {
        duration_ms(self.ttl)
    }
}
