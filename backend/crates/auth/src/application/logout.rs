//! Logout Use Case

use std::sync::Arc;

use kernel::id::SessionId;
use platform::clock::SharedClock;

use crate::application::config::AuthConfig;
use crate::domain::repository::SessionRepository;
use crate::domain::token::TokenSigner;

/// Logout use case
pub struct LogoutUseCase<R>
where
    R: SessionRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
    clock: SharedClock,
}

impl<R> LogoutUseCase<R>
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

    /// Delete the session named by a valid token. Anything else is ignored.
    /// Returns whether a session was deleted.
    pub async fn execute(&self, token: Option<&str>) -> bool {
        let signer = TokenSigner::new(self.config.token_secret);
        let Some(claims) = token.and_then(|t| signer.verify(t, self.clock.now_ms()).ok()) else {
            return false;
        };
        let Ok(session_id) = claims.session_id.parse::<SessionId>() else {
            return false;
        };

        let deleted = self.repo.delete(&session_id).await;
        if deleted {
            tracing::info!(session_id = %session_id, "Admin logout");
        }
        deleted
    }
}
