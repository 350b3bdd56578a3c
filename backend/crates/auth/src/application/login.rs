//! Login Use Case
//!
//! Checks the admin password and opens a session.

use std::net::IpAddr;
use std::sync::Arc;

use kernel::id::SessionId;
use platform::clock::SharedClock;
use platform::password::ClearTextPassword;
use shield::ReputationStore;

use crate::application::config::AuthConfig;
use crate::domain::repository::SessionRepository;
use crate::domain::session::AdminSession;
use crate::domain::token::{TokenClaims, TokenSigner};
use crate::error::{AuthError, AuthResult};

/// Login input
#[derive(Debug)]
pub struct LoginInput {
    /// `None` when the body had no string password
    pub password: Option<String>,
    pub ip: IpAddr,
    pub user_agent: String,
}

/// Login output
#[derive(Debug, Clone)]
pub struct LoginOutput {
    pub token: String,
    pub session_id: SessionId,
}

/// Login use case
pub struct LoginUseCase<R>
where
    R: SessionRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
    reputation: Arc<ReputationStore>,
    clock: SharedClock,
}

impl<R> LoginUseCase<R>
where
    R: SessionRepository,
{
    pub fn new(
        repo: Arc<R>,
        config: Arc<AuthConfig>,
        reputation: Arc<ReputationStore>,
        clock: SharedClock,
    ) -> Self {
        Self {
            repo,
            config,
            reputation,
            clock,
        }
    }

    pub async fn execute(&self, input: LoginInput) -> AuthResult<LoginOutput> {
        tracing::info!(ip = %input.ip, "Login attempt received");

        let password = input
            .password
            .filter(|p| !p.is_empty())
            .ok_or(AuthError::PasswordRequired)?;

        if self.reputation.is_blocked(input.ip) {
            return Err(AuthError::IpBlocked);
        }

        if !self.password_matches(password).await? {
            let reputation = self.reputation.record_failed_login(input.ip);
            tracing::warn!(ip = %input.ip, ?reputation, "Failed admin login");
            return Err(AuthError::InvalidCredentials);
        }

        self.reputation.clear(input.ip);

        let now_ms = self.clock.now_ms();
        let session = AdminSession::new(input.ip, input.user_agent, now_ms);
        let session_id = session.session_id;

        let iat = now_ms / 1000;
        let claims = TokenClaims {
            is_admin: true,
            session_id: session_id.to_string(),
            iat,
            exp: iat + self.config.token_ttl_secs(),
        };
        let token = TokenSigner::new(self.config.token_secret)
            .sign(&claims)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        self.repo.create(session).await;

        tracing::info!(ip = %input.ip, session_id = %session_id, "Admin login");

        Ok(LoginOutput { token, session_id })
    }

    /// Argon2 verification runs off the async workers
    async fn password_matches(&self, password: String) -> AuthResult<bool> {
        let Ok(password) = ClearTextPassword::new(password) else {
            return Ok(false);
        };
        let hash = self.config.admin_password.clone();
        tokio::task::spawn_blocking(move || hash.verify(&password))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))
    }
}
