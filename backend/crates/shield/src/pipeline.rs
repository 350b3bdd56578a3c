//! Pipeline Orchestrator
//!
//! [`Shield`] owns every security store and wires the guards around a
//! router in their fixed order.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::extract::State;
use axum::middleware::{self, Next};
use axum::response::Response;
use platform::client::{ClientIp, resolve_client_ip};
use platform::clock::SharedClock;
use tower::ServiceBuilder;

use crate::config::ShieldConfig;
use crate::limiter::{self, RateLimiter};
use crate::replay::ReplayGuard;
use crate::reputation::ReputationStore;
use crate::{cors, headers, inspect};

/// Evictions made by one [`Shield::sweep`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub reputation: usize,
    pub replay: usize,
    pub rate_limit_windows: usize,
}

impl SweepReport {
    pub fn total(&self) -> usize {
        self.reputation + self.replay + self.rate_limit_windows
    }
}

/// Security pipeline state. Cheap to clone; clones share the stores.
#[derive(Debug, Clone)]
pub struct Shield {
    config: Arc<ShieldConfig>,
    reputation: Arc<ReputationStore>,
    replay: Arc<ReplayGuard>,
    general: Arc<RateLimiter>,
    mutation: Arc<RateLimiter>,
    sensitive: Arc<RateLimiter>,
}

impl Shield {
    pub fn new(config: ShieldConfig, clock: SharedClock) -> Self {
        let reputation = ReputationStore::new(config.reputation.clone(), clock.clone());
        let replay = ReplayGuard::new(config.replay_window_ms(), clock.clone());
        let general = RateLimiter::general(config.general_limit.clone(), clock.clone());
        let mutation = RateLimiter::mutation(config.mutation_limit.clone(), clock.clone());
        let sensitive = RateLimiter::sensitive(config.sensitive_limit.clone(), clock);

        Self {
            config: Arc::new(config),
            reputation: Arc::new(reputation),
            replay: Arc::new(replay),
            general: Arc::new(general),
            mutation: Arc::new(mutation),
            sensitive: Arc::new(sensitive),
        }
    }

    pub fn config(&self) -> &ShieldConfig {
        &self.config
    }

    pub fn reputation(&self) -> &Arc<ReputationStore> {
        &self.reputation
    }

    pub fn replay(&self) -> &ReplayGuard {
        &self.replay
    }

    /// Limiter for public write routes, attached per route with
    /// `route_layer(from_fn_with_state(limiter, shield::limiter::rate_limit))`
    pub fn mutation_limiter(&self) -> Arc<RateLimiter> {
        self.mutation.clone()
    }

    /// Limiter for login
    pub fn sensitive_limiter(&self) -> Arc<RateLimiter> {
        self.sensitive.clone()
    }

    /// Wrap `router` in the global guard chain, outermost first:
    /// client IP, security headers, general limiter, CORS, inspection.
    pub fn protect<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn_with_state(
                    self.config.trusted_proxy_hops,
                    attach_client_ip,
                ))
                .layer(middleware::from_fn(headers::security_headers))
                .layer(middleware::from_fn_with_state(
                    self.general.clone(),
                    limiter::rate_limit,
                ))
                .layer(cors::cors_layer(&self.config))
                .layer(middleware::from_fn_with_state(
                    self.clone(),
                    inspect::inspect,
                )),
        )
    }

    /// Evict expired reputation records, replay keys and rate limit windows
    pub fn sweep(&self) -> SweepReport {
        SweepReport {
            reputation: self.reputation.sweep(),
            replay: self.replay.sweep(),
            rate_limit_windows: self.general.cleanup()
                + self.mutation.cleanup()
                + self.sensitive.cleanup(),
        }
    }
}

/// Resolve the client IP once and store it for every later layer
async fn attach_client_ip(
    State(trusted_hops): State<usize>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let ip = resolve_client_ip(req.headers(), req.extensions(), trusted_hops);
    req.extensions_mut().insert(ClientIp(ip));
    next.run(req).await
}
