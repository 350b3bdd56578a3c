//! Auth Middleware
//!
//! Middleware for requiring an admin session on protected routes.

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use platform::bearer::extract_bearer_token;
use platform::client::request_client_ip;

use crate::domain::repository::SessionRepository;
use crate::error::AuthError;
use crate::presentation::handlers::AuthAppState;

/// Middleware that requires a valid admin session. On success the verified
/// [`TokenClaims`](crate::domain::token::TokenClaims) are stored in the
/// request extensions.
pub async fn require_admin<R>(
    State(state): State<AuthAppState<R>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError>
where
    R: SessionRepository + Send + Sync + 'static,
{
    let ip = request_client_ip(req.headers(), req.extensions());
    let token = extract_bearer_token(req.headers()).map(str::to_owned);

    let claims = state.authorize(token.as_deref(), ip).await?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
