//! Repository Traits
//!
//! Interfaces for captcha storage. Implementation is in the infra layer.

use kernel::id::CaptchaToken;

use crate::domain::entities::Captcha;

/// Captcha repository trait
#[trait_variant::make(CaptchaRepository: Send)]
pub trait LocalCaptchaRepository {
    /// Store a newly issued captcha
    async fn create(&self, captcha: Captcha);

    /// Remove and return a captcha atomically (no double redemption)
    async fn consume(&self, token: &CaptchaToken) -> Option<Captcha>;

    /// Delete captchas that expired before `now_ms`. Returns how many.
    async fn purge_expired(&self, now_ms: i64) -> usize;
}
