//! Background sweep of expired security records
//!
//! Every store also expires entries lazily on read; the sweep bounds memory
//! for keys that are never read again.

use std::time::Duration;

use shield::SweepReport;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

use crate::app::AppState;

pub const SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepSummary {
    pub shield: SweepReport,
    pub captchas: usize,
    pub sessions: usize,
}

impl SweepSummary {
    pub fn total(&self) -> usize {
        self.shield.total() + self.captchas + self.sessions
    }
}

pub async fn sweep_once(state: &AppState) -> SweepSummary {
    SweepSummary {
        shield: state.shield.sweep(),
        captchas: state.captcha.purge_expired().await,
        sessions: state.auth.purge_idle_sessions().await,
    }
}

/// Run [`sweep_once`] every `period`, starting one period from now
pub fn spawn_sweeper(state: AppState, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let summary = sweep_once(&state).await;
            tracing::info!(
                reputation = summary.shield.reputation,
                replay = summary.shield.replay,
                rate_limit_windows = summary.shield.rate_limit_windows,
                captchas = summary.captchas,
                sessions = summary.sessions,
                "Security stores swept"
            );
        }
    })
}
