//! Issue Captcha Use Case

use std::sync::Arc;

use kernel::id::CaptchaToken;
use platform::clock::SharedClock;

use crate::application::config::CaptchaConfig;
use crate::domain::entities::Captcha;
use crate::domain::repository::CaptchaRepository;
use crate::domain::services::generate_problem;

/// Output DTO for issue captcha
#[derive(Debug, Clone)]
pub struct IssueCaptchaOutput {
    pub token: CaptchaToken,
    pub question: String,
    pub expires_at_ms: i64,
}

/// Issue Captcha Use Case
pub struct IssueCaptchaUseCase<R>
where
    R: CaptchaRepository,
{
    repo: Arc<R>,
    config: Arc<CaptchaConfig>,
    clock: SharedClock,
}

impl<R> IssueCaptchaUseCase<R>
where
    R: CaptchaRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<CaptchaConfig>, clock: SharedClock) -> Self {
        Self {
            repo,
            config,
            clock,
        }
    }

    pub async fn execute(&self) -> IssueCaptchaOutput {
        // ThreadRng is not Send; keep it out of the awaited section
        let problem = {
            let mut rng = rand::rng();
            generate_problem(&mut rng, self.config.operand_min, self.config.operand_max)
        };

        let captcha = Captcha::new(&problem, self.clock.now_ms(), self.config.ttl_ms());
        let output = IssueCaptchaOutput {
            token: captcha.token,
            question: problem.question(),
            expires_at_ms: captcha.expires_at_ms,
        };

        self.repo.create(captcha).await;

        tracing::debug!(
            token = %output.token,
            operator = problem.operator().symbol(),
            "Issued captcha"
        );

        output
    }
}
