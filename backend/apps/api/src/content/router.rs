//! Content Router

use std::sync::Arc;

use auth::AuthAppState;
use auth::domain::repository::SessionRepository;
use auth::require_admin;
use axum::Router;
use axum::handler::Handler;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post};
use shield::limiter::{RateLimiter, rate_limit};

use super::handlers::{self, ContentAppState};
use super::repository::ContentRepository;

/// Routes relative to the `/api` prefix. Public writes go through the
/// `mutation` limiter; article management and upload need an admin session.
pub fn content_router<R, S>(
    state: ContentAppState<R>,
    mutation: Arc<RateLimiter>,
    admin: AuthAppState<S>,
) -> Router
where
    R: ContentRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
{
    let limited = from_fn_with_state(mutation, rate_limit);
    let admin_only = from_fn_with_state(admin, require_admin::<S>);

    Router::new()
        .route("/stats", get(handlers::get_stats::<R>))
        .route(
            "/stats/view",
            post(handlers::record_view::<R>.layer(limited.clone())),
        )
        .route(
            "/stats/like",
            post(handlers::record_like::<R>.layer(limited.clone())),
        )
        .route(
            "/comments",
            get(handlers::list_comments::<R>)
                .post(handlers::create_comment::<R>.layer(limited.clone())),
        )
        .route(
            "/articles",
            get(handlers::list_articles::<R>)
                .post(handlers::create_article::<R>.layer(admin_only.clone())),
        )
        .route(
            "/articles/{id}",
            delete(handlers::delete_article::<R>.layer(admin_only.clone())),
        )
        .route(
            "/articles/{id}/like",
            post(handlers::like_article::<R>.layer(limited.clone())),
        )
        .route(
            "/articles/{id}/comments",
            post(handlers::comment_on_article::<R>.layer(limited)),
        )
        .route("/upload", post(handlers::upload_image.layer(admin_only)))
        .with_state(state)
}
