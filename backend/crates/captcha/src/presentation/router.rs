//! Captcha Router

use axum::{Router, routing::get};

use crate::domain::repository::CaptchaRepository;
use crate::presentation::handlers::{self, CaptchaAppState};

/// Routes relative to the `/api` prefix
pub fn captcha_router<R>(state: CaptchaAppState<R>) -> Router
where
    R: CaptchaRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/captcha", get(handlers::issue_captcha::<R>))
        .with_state(state)
}
