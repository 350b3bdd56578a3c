//! Domain Entities
//!
//! Core business entities for the captcha domain.

use kernel::id::CaptchaToken;

use crate::domain::value_objects::MathProblem;

/// Captcha entity - an issued challenge awaiting its single redemption
#[derive(Debug, Clone)]
pub struct Captcha {
    pub token: CaptchaToken,
    pub answer: i64,
    pub expires_at_ms: i64,
}

impl Captcha {
    /// Create a new captcha for `problem`, valid for `ttl_ms` from `now_ms`
    pub fn new(problem: &MathProblem, now_ms: i64, ttl_ms: i64) -> Self {
        Self {
            token: CaptchaToken::new(),
            answer: problem.answer(),
            expires_at_ms: now_ms + ttl_ms,
        }
    }

    /// Check if the captcha has expired
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms > self.expires_at_ms
    }
}
