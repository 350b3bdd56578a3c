//! Verify Token Use Case
//!
//! Answers "is this token still good?" for the admin UI. Lenient about IPs:
//! a new IP is added while there is room, but a full session is not revoked
//! here.

use std::net::IpAddr;
use std::sync::Arc;

use kernel::id::SessionId;
use platform::clock::SharedClock;

use crate::application::config::AuthConfig;
use crate::domain::repository::SessionRepository;
use crate::domain::session::SessionCheck;
use crate::domain::token::TokenSigner;
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyOutput {
    pub expires_at_ms: i64,
}

/// Verify token use case
pub struct VerifyUseCase<R>
where
    R: SessionRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
    clock: SharedClock,
}

impl<R> VerifyUseCase<R>
where
    R: SessionRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>, clock: SharedClock) -> Self {
        Self {
            repo,
            config,
            clock,
        }
    }

    pub async fn execute(&self, token: Option<&str>, ip: IpAddr) -> AuthResult<VerifyOutput> {
        let token = token.ok_or(AuthError::AuthenticationRequired)?;
        let now_ms = self.clock.now_ms();

        let claims = TokenSigner::new(self.config.token_secret)
            .verify(token, now_ms)
            .map_err(|_| AuthError::AdminRequired)?;
        let session_id: SessionId = claims
            .session_id
            .parse()
            .map_err(|_| AuthError::AdminRequired)?;

        match self
            .repo
            .observe(&session_id, ip, now_ms, &self.config.session_policy())
            .await
        {
            SessionCheck::Admitted(_) => Ok(VerifyOutput {
                expires_at_ms: claims.expires_at_ms(),
            }),
            SessionCheck::Missing | SessionCheck::IpLimitExceeded => {
                Err(AuthError::SessionExpired)
            }
        }
    }
}
