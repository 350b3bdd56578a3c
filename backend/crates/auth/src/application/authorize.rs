//! Authorize Use Case
//!
//! Gate for admin-only routes. Order of checks: bearer present, token valid
//! and admin, session live, client IP admitted.

use std::net::IpAddr;
use std::sync::Arc;

use kernel::id::SessionId;
use platform::clock::SharedClock;

use crate::application::config::AuthConfig;
use crate::domain::repository::SessionRepository;
use crate::domain::session::SessionCheck;
use crate::domain::token::{TokenClaims, TokenSigner};
use crate::error::{AuthError, AuthResult};

/// Authorize use case
pub struct AuthorizeUseCase<R>
where
    R: SessionRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
    clock: SharedClock,
}

impl<R> AuthorizeUseCase<R>
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

    pub async fn execute(&self, token: Option<&str>, ip: IpAddr) -> AuthResult<TokenClaims> {
        let token = token.ok_or(AuthError::AuthenticationRequired)?;
        let now_ms = self.clock.now_ms();

        let claims = TokenSigner::new(self.config.token_secret)
            .verify(token, now_ms)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected admin token");
                AuthError::AdminRequired
            })?;
        if !claims.is_admin {
            return Err(AuthError::AdminRequired);
        }
        let session_id: SessionId = claims
            .session_id
            .parse()
            .map_err(|_| AuthError::AdminRequired)?;

        match self
            .repo
            .authorize(&session_id, ip, now_ms, &self.config.session_policy())
            .await
        {
            SessionCheck::Admitted(_) => Ok(claims),
            SessionCheck::Missing => Err(AuthError::SessionExpired),
            SessionCheck::IpLimitExceeded => {
                tracing::warn!(session_id = %session_id, ip = %ip, "Too many IP changes for session");
                Err(AuthError::TooManyIpChanges)
            }
        }
    }
}
