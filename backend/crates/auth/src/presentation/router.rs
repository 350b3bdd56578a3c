//! Auth Router

use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use shield::limiter::{RateLimiter, rate_limit};

use crate::domain::repository::SessionRepository;
use crate::presentation::handlers::{self, AuthAppState};

/// Routes relative to the `/api` prefix. `sensitive` guards login.
pub fn auth_router<R>(state: AuthAppState<R>, sensitive: Arc<RateLimiter>) -> Router
where
    R: SessionRepository + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/auth/login",
            post(handlers::login::<R>).route_layer(from_fn_with_state(sensitive, rate_limit)),
        )
        .route("/auth/logout", post(handlers::logout::<R>))
        .route("/auth/verify", get(handlers::verify::<R>))
        .with_state(state)
}
