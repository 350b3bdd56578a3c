//! HTTP Handlers

use std::net::IpAddr;
use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use platform::bearer::extract_bearer_token;
use platform::client::{ClientIp, extract_user_agent};
use platform::clock::SharedClock;
use shield::ReputationStore;

use crate::application::config::AuthConfig;
use crate::application::{
    AuthorizeUseCase, LoginInput, LoginUseCase, LogoutUseCase, VerifyUseCase,
};
use crate::domain::repository::SessionRepository;
use crate::domain::token::TokenClaims;
use crate::error::AuthResult;
use crate::presentation::dto::{LoginRequest, LoginResponse, SuccessResponse, VerifyResponse};

/// Shared state for auth handlers and the `require_admin` middleware
pub struct AuthAppState<R>
where
    R: SessionRepository + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
    pub reputation: Arc<ReputationStore>,
    pub clock: SharedClock,
}

impl<R> Clone for AuthAppState<R>
where
    R: SessionRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
            reputation: self.reputation.clone(),
            clock: self.clock.clone(),
        }
    }
}

impl<R> AuthAppState<R>
where
    R: SessionRepository + Send + Sync + 'static,
{
    pub fn new(
        repo: R,
        config: AuthConfig,
        reputation: Arc<ReputationStore>,
        clock: SharedClock,
    ) -> Self {
        Self {
            repo: Arc::new(repo),
            config: Arc::new(config),
            reputation,
            clock,
        }
    }

    /// Admin gate shared by the middleware and any handler that needs it
    pub async fn authorize(&self, token: Option<&str>, ip: IpAddr) -> AuthResult<TokenClaims> {
        AuthorizeUseCase::new(self.repo.clone(), self.config.clone(), self.clock.clone())
            .execute(token, ip)
            .await
    }

    /// Sweep idle sessions
    pub async fn purge_idle_sessions(&self) -> usize {
        self.repo
            .purge_idle(self.clock.now_ms(), &self.config.session_policy())
            .await
    }
}

/// POST /api/auth/login
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    ClientIp(ip): ClientIp,
    headers: HeaderMap,
    body: Bytes,
) -> AuthResult<Json<LoginResponse>>
where
    R: SessionRepository + Send + Sync + 'static,
{
    let use_case = LoginUseCase::new(
        state.repo.clone(),
        state.config.clone(),
        state.reputation.clone(),
        state.clock.clone(),
    );

    let input = LoginInput {
        password: LoginRequest::from_body(&body).into_password(),
        ip,
        user_agent: extract_user_agent(&headers).to_owned(),
    };

    let output = use_case.execute(input).await?;

    Ok(Json(LoginResponse {
        success: true,
        token: output.token,
    }))
}

/// POST /api/auth/logout
pub async fn logout<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> Json<SuccessResponse>
where
    R: SessionRepository + Send + Sync + 'static,
{
    LogoutUseCase::new(state.repo.clone(), state.config.clone(), state.clock.clone())
        .execute(extract_bearer_token(&headers))
        .await;

    Json(SuccessResponse { success: true })
}

/// GET /api/auth/verify
pub async fn verify<R>(
    State(state): State<AuthAppState<R>>,
    ClientIp(ip): ClientIp,
    headers: HeaderMap,
) -> Response
where
    R: SessionRepository + Send + Sync + 'static,
{
    let use_case =
        VerifyUseCase::new(state.repo.clone(), state.config.clone(), state.clock.clone());

    match use_case.execute(extract_bearer_token(&headers), ip).await {
        Ok(output) => Json(VerifyResponse {
            valid: true,
            expires_at: Some(output.expires_at_ms),
        })
        .into_response(),
        Err(e) => {
            tracing::debug!(error = %e, "Token verification failed");
            (
                StatusCode::UNAUTHORIZED,
                Json(VerifyResponse {
                    valid: false,
                    expires_at: None,
                }),
            )
                .into_response()
        }
    }
}
