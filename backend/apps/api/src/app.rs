//! Application wiring
//!
//! Builds every store once and composes the routers behind the shield.

use auth::{AuthAppState, InMemorySessionRepository, auth_router};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use captcha::{CaptchaAppState, InMemoryCaptchaRepository, captcha_router};
use kernel::error::app_error::AppError;
use platform::clock::SharedClock;
use shield::Shield;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::content::{ContentAppState, InMemoryContentRepository, content_router};

/// Every store the server owns. Clones share state.
#[derive(Clone)]
pub struct AppState {
    pub shield: Shield,
    pub captcha: CaptchaAppState<InMemoryCaptchaRepository>,
    pub auth: AuthAppState<InMemorySessionRepository>,
    pub content: ContentAppState<InMemoryContentRepository>,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(config: &AppConfig, clock: SharedClock) -> Self {
        let shield = Shield::new(config.shield_config(), clock.clone());
        let captcha = CaptchaAppState::new(
            InMemoryCaptchaRepository::new(),
            config.captcha_config(),
            clock.clone(),
        );
        let auth = AuthAppState::new(
            InMemorySessionRepository::new(),
            config.auth_config(),
            shield.reputation().clone(),
            clock.clone(),
        );
        let content =
            ContentAppState::new(InMemoryContentRepository::new(), captcha.clone(), clock);

        Self {
            shield,
            captcha,
            auth,
            content,
            max_body_bytes: config.max_body_bytes,
        }
    }

    /// The full application: `/api` routes wrapped in the shield pipeline
    pub fn router(&self) -> Router {
        let api = Router::new()
            .merge(captcha_router(self.captcha.clone()))
            .merge(auth_router(
                self.auth.clone(),
                self.shield.sensitive_limiter(),
            ))
            .merge(content_router(
                self.content.clone(),
                self.shield.mutation_limiter(),
                self.auth.clone(),
            ))
            .fallback(api_not_found);

        let app = Router::new()
            .nest("/api", api)
            .fallback(not_found)
            .layer(DefaultBodyLimit::max(self.max_body_bytes));

        self.shield
            .protect(app)
            .layer(TraceLayer::new_for_http())
    }
}

async fn api_not_found() -> AppError {
    AppError::not_found("API endpoint not found")
}

async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}
