//! CORS
//!
//! Requests without an `Origin` header always pass. In development every
//! origin is accepted; in production only the allow-list. A rejected origin
//! is not an error: the response simply carries no CORS headers.

use std::sync::Arc;
use std::time::Duration;

use axum::http::request::Parts;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::ShieldConfig;

const MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

pub fn is_origin_allowed(production: bool, allowed: &[String], origin: &str) -> bool {
    !production || allowed.iter().any(|o| o == origin)
}

pub fn cors_layer(config: &ShieldConfig) -> CorsLayer {
    let production = config.production;
    let allowed: Arc<[String]> = config.allowed_origins.clone().into();

    let origin = AllowOrigin::predicate(move |origin: &HeaderValue, _parts: &Parts| {
        let origin = origin.to_str().unwrap_or_default();
        let ok = is_origin_allowed(production, &allowed, origin);
        if !ok {
            tracing::warn!(origin, "CORS origin rejected");
        }
        ok
    });

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
        .allow_credentials(true)
        .max_age(MAX_AGE)
}
