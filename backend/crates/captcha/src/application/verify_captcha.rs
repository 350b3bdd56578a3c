//! Verify Captcha Use Case

use std::sync::Arc;

use kernel::id::CaptchaToken;
use platform::clock::SharedClock;
use serde_json::Value;

use crate::domain::repository::CaptchaRepository;
use crate::domain::services::parse_answer;
use crate::error::{CaptchaError, CaptchaResult};

/// Input DTO for verify captcha, taken as loosely typed JSON from the form
#[derive(Debug, Clone, Default)]
pub struct VerifyCaptchaInput {
    pub token: Option<String>,
    pub answer: Option<Value>,
}

impl VerifyCaptchaInput {
    /// An empty or absent token, or an absent answer, counts as missing.
    /// A present answer, even `null` or `""`, is checked and spends the token.
    fn present(&self) -> Option<(&str, &Value)> {
        let token = self.token.as_deref().filter(|t| !t.is_empty())?;
        let answer = self.answer.as_ref()?;
        Some((token, answer))
    }
}

/// Verify Captcha Use Case
pub struct VerifyCaptchaUseCase<R>
where
    R: CaptchaRepository,
{
    repo: Arc<R>,
    clock: SharedClock,
}

impl<R> VerifyCaptchaUseCase<R>
where
    R: CaptchaRepository,
{
    pub fn new(repo: Arc<R>, clock: SharedClock) -> Self {
        Self { repo, clock }
    }

    /// Fails closed: any missing piece or lookup failure is a rejection.
    /// A found token is consumed before the expiry and answer checks.
    pub async fn execute(&self, input: &VerifyCaptchaInput) -> CaptchaResult<()> {
        let (token, answer) = input.present().ok_or(CaptchaError::Missing)?;

        let token: CaptchaToken = token.parse().map_err(|_| CaptchaError::NotFound)?;

        let captcha = self
            .repo
            .consume(&token)
            .await
            .ok_or(CaptchaError::NotFound)?;

        if captcha.is_expired(self.clock.now_ms()) {
            return Err(CaptchaError::Expired);
        }

        if parse_answer(answer) != Some(captcha.answer) {
            return Err(CaptchaError::WrongAnswer);
        }

        tracing::debug!(token = %token, "Captcha verified");
        Ok(())
    }
}
