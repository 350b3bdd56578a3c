//! In-memory Repository Implementation

use dashmap::DashMap;
use kernel::id::CaptchaToken;

use crate::domain::entities::Captcha;
use crate::domain::repository::CaptchaRepository;

/// Process-local captcha store
#[derive(Debug, Default)]
pub struct InMemoryCaptchaRepository {
    captchas: DashMap<CaptchaToken, Captcha>,
}

impl InMemoryCaptchaRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.captchas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captchas.is_empty()
    }
}

impl CaptchaRepository for InMemoryCaptchaRepository {
    async fn create(&self, captcha: Captcha) {
        self.captchas.insert(captcha.token, captcha);
    }

    async fn consume(&self, token: &CaptchaToken) -> Option<Captcha> {
        self.captchas.remove(token).map(|(_, captcha)| captcha)
    }

    async fn purge_expired(&self, now_ms: i64) -> usize {
        let before = self.captchas.len();
        self.captchas.retain(|_, c| !c.is_expired(now_ms));
        let removed = before.saturating_sub(self.captchas.len());
        if removed > 0 {
            tracing::debug!(removed, "Purged expired captchas");
        }
        removed
    }
}
