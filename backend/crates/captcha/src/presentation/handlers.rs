//! HTTP Handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use platform::clock::SharedClock;

use crate::application::config::CaptchaConfig;
use crate::application::issue_captcha::IssueCaptchaUseCase;
use crate::application::verify_captcha::{VerifyCaptchaInput, VerifyCaptchaUseCase};
use crate::domain::repository::CaptchaRepository;
use crate::error::CaptchaResult;
use crate::presentation::dto::CaptchaResponse;

/// Shared state for captcha handlers, also handed to routes that need to
/// verify a captcha before accepting a write.
pub struct CaptchaAppState<R>
where
    R: CaptchaRepository + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<CaptchaConfig>,
    pub clock: SharedClock,
}

impl<R> Clone for CaptchaAppState<R>
where
    R: CaptchaRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
            clock: self.clock.clone(),
        }
    }
}

impl<R> CaptchaAppState<R>
where
    R: CaptchaRepository + Send + Sync + 'static,
{
    pub fn new(repo: R, config: CaptchaConfig, clock: SharedClock) -> Self {
        Self {
            repo: Arc::new(repo),
            config: Arc::new(config),
            clock,
        }
    }

    /// Redeem a captcha. Consumes the token whatever the outcome.
    pub async fn verify(&self, input: &VerifyCaptchaInput) -> CaptchaResult<()> {
        VerifyCaptchaUseCase::new(self.repo.clone(), self.clock.clone())
            .execute(input)
            .await
    }

    /// Sweep expired captchas
    pub async fn purge_expired(&self) -> usize {
        self.repo.purge_expired(self.clock.now_ms()).await
    }
}

/// GET /api/captcha
pub async fn issue_captcha<R>(State(state): State<CaptchaAppState<R>>) -> Json<CaptchaResponse>
where
    R: CaptchaRepository + Send + Sync + 'static,
{
    let use_case =
        IssueCaptchaUseCase::new(state.repo.clone(), state.config.clone(), state.clock.clone());

    let output = use_case.execute().await;

    Json(CaptchaResponse {
        token: output.token.to_string(),
        question: output.question,
    })
}
