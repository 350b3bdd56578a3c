//! Rate Limit Middleware
//!
//! Three independent fixed-window limiters share one implementation and
//! differ in key, scope and message:
//!
//! | limiter   | key       | scope                    | default      |
//! |-----------|-----------|--------------------------|--------------|
//! | general   | IP        | `/api/`, static exempt   | 100 / 15 min |
//! | mutation  | IP + path | routes it is attached to | 10 / min     |
//! | sensitive | IP        | routes it is attached to | 5 / hour     |

use std::net::IpAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{OriginalUri, State};
use axum::http::{HeaderMap, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use platform::client::request_client_ip;
use platform::clock::SharedClock;
use platform::rate_limit::{FixedWindowStore, RateLimitConfig, RateLimitResult};

use crate::error::{ShieldError, ShieldResult};

pub const GENERAL_MESSAGE: &str = "Too many requests, please try again later.";
pub const MUTATION_MESSAGE: &str = "Too many submissions, please wait a moment.";
pub const SENSITIVE_MESSAGE: &str = "Rate limit exceeded for this operation.";

/// Extensions that never count against the general limiter
pub const STATIC_EXTENSIONS: &[&str] = &[
    "css", "js", "png", "jpg", "jpeg", "gif", "ico", "svg", "woff", "woff2",
];

/// What a counter is keyed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKey {
    Ip,
    IpAndPath,
}

/// Which requests a limiter counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitScope {
    /// Every request reaching the layer
    All,
    /// `/api/` paths only, static assets exempt
    Api,
}

#[derive(Debug)]
pub struct RateLimiter {
    name: &'static str,
    message: &'static str,
    key: LimitKey,
    scope: LimitScope,
    config: RateLimitConfig,
    store: FixedWindowStore,
}

impl RateLimiter {
    pub fn new(
        name: &'static str,
        message: &'static str,
        key: LimitKey,
        scope: LimitScope,
        config: RateLimitConfig,
        clock: SharedClock,
    ) -> Self {
        Self {
            name,
            message,
            key,
            scope,
            config,
            store: FixedWindowStore::new(clock),
        }
    }

    pub fn general(config: RateLimitConfig, clock: SharedClock) -> Self {
        Self::new(
            "general",
            GENERAL_MESSAGE,
            LimitKey::Ip,
            LimitScope::Api,
            config,
            clock,
        )
    }

    pub fn mutation(config: RateLimitConfig, clock: SharedClock) -> Self {
        Self::new(
            "mutation",
            MUTATION_MESSAGE,
            LimitKey::IpAndPath,
            LimitScope::All,
            config,
            clock,
        )
    }

    pub fn sensitive(config: RateLimitConfig, clock: SharedClock) -> Self {
        Self::new(
            "sensitive",
            SENSITIVE_MESSAGE,
            LimitKey::Ip,
            LimitScope::All,
            config,
            clock,
        )
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    pub fn applies_to(&self, path: &str) -> bool {
        match self.scope {
            LimitScope::All => true,
            LimitScope::Api => {
                (path == "/api" || path.starts_with("/api/")) && !is_static_asset(path)
            }
        }
    }

    fn key_for(&self, ip: IpAddr, path: &str) -> String {
        match self.key {
            LimitKey::Ip => ip.to_string(),
            LimitKey::IpAndPath => format!("{ip}:{path}"),
        }
    }

    /// Count one request. `Err` once the window is exhausted.
    pub fn check(&self, ip: IpAddr, path: &str) -> ShieldResult<RateLimitResult> {
        let result = self.store.hit(&self.key_for(ip, path), &self.config);
        if result.allowed {
            return Ok(result);
        }
        tracing::warn!(limiter = self.name, ip = %ip, path, "Rate limit hit");
        Err(ShieldError::RateLimited {
            message: self.message,
            limit: result.limit,
            reset_after_secs: result.reset_after_secs(self.store.clock().now_ms()),
        })
    }

    fn reset_after_secs(&self, result: &RateLimitResult) -> u64 {
        result.reset_after_secs(self.store.clock().now_ms())
    }

    /// Drop closed windows. Returns how many were removed.
    pub fn cleanup(&self) -> usize {
        self.store.cleanup()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

pub fn is_static_asset(path: &str) -> bool {
    path.rsplit_once('.')
        .is_some_and(|(_, ext)| STATIC_EXTENSIONS.contains(&ext))
}

fn set_rate_limit_headers(headers: &mut HeaderMap, result: &RateLimitResult, reset_after: u64) {
    headers.insert("ratelimit-limit", HeaderValue::from(result.limit));
    headers.insert("ratelimit-remaining", HeaderValue::from(result.remaining));
    headers.insert("ratelimit-reset", HeaderValue::from(reset_after));
}

/// Full request path, unaffected by router nesting
pub(crate) fn request_path(req: &Request<Body>) -> String {
    req.extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.0.path().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned())
}

/// Rate limit middleware, attached with `from_fn_with_state`
pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let path = request_path(&req);
    if !limiter.applies_to(&path) {
        return next.run(req).await;
    }

    let ip = request_client_ip(req.headers(), req.extensions());
    let result = match limiter.check(ip, &path) {
        Ok(result) => result,
        Err(e) => return e.into_response(),
    };

    let mut response = next.run(req).await;
    let reset_after = limiter.reset_after_secs(&result);
    set_rate_limit_headers(response.headers_mut(), &result, reset_after);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::clock::ManualClock;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_static_assets() {
        assert!(is_static_asset("/api/files/logo.png"));
        assert!(is_static_asset("/app.js"));
        assert!(is_static_asset("/fonts/a.woff2"));
        assert!(!is_static_asset("/api/articles"));
        assert!(!is_static_asset("/api/v1.2/articles"));
    }

    #[test]
    fn test_general_scope() {
        let limiter = RateLimiter::general(RateLimitConfig::new(1, 60), ManualClock::new(0));
        assert!(limiter.applies_to("/api/stats"));
        assert!(limiter.applies_to("/api"));
        assert!(!limiter.applies_to("/"));
        assert!(!limiter.applies_to("/apiary"));
        assert!(!limiter.applies_to("/api/style.css"));
    }

    #[test]
    fn test_mutation_keys_on_path() {
        let limiter = RateLimiter::mutation(RateLimitConfig::new(1, 60), ManualClock::new(0));
        let addr = ip("10.0.0.1");
        assert!(limiter.check(addr, "/api/stats/like").is_ok());
        assert!(limiter.check(addr, "/api/stats/view").is_ok());
        let err = limiter.check(addr, "/api/stats/like").unwrap_err();
        assert!(matches!(
            err,
            ShieldError::RateLimited {
                message: MUTATION_MESSAGE,
                limit: 1,
                reset_after_secs: 60
            }
        ));
    }

    #[test]
    fn test_sensitive_keys_on_ip_only() {
        let limiter = RateLimiter::sensitive(RateLimitConfig::new(1, 3600), ManualClock::new(0));
        let addr = ip("10.0.0.1");
        assert!(limiter.check(addr, "/api/auth/login").is_ok());
        assert!(limiter.check(addr, "/api/other").is_err());
        assert!(limiter.check(ip("10.0.0.2"), "/api/auth/login").is_ok());
    }
}
