//! Request Inspection
//!
//! The innermost pipeline layer. Buffers and cleans the payload, then runs
//! the guards in a fixed order, stopping at the first failure:
//!
//! 1. body size limit and parsing (JSON and url-encoded forms only)
//! 2. sanitizing of body and query, duplicate query keys collapsed
//! 3. pattern guards: XSS on the URL is logged, RCE anywhere is rejected
//!    and penalized
//! 4. probe path and scanner user-agent blocklists
//! 5. IP reputation gate
//! 6. replay guard
//! 7. field tampering guard
//!
//! The cleaned payload is written back into the request before it reaches
//! the route.

use std::net::IpAddr;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::request::Parts;
use axum::http::uri::PathAndQuery;
use axum::http::{HeaderMap, HeaderValue, Method, Request, Uri, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use platform::client::{extract_user_agent, request_client_ip};
use serde_json::Value;

use crate::blocklist;
use crate::error::{ShieldError, ShieldResult};
use crate::limiter::request_path;
use crate::patterns;
use crate::pipeline::Shield;
use crate::replay::REQUEST_ID_HEADER;
use crate::sanitize::{self, SanitizedQuery};

/// Top-level fields clients may never set outside admin and auth routes
pub const PROTECTED_FIELDS: &[&str] = &[
    "_id",
    "id",
    "isAdmin",
    "role",
    "permissions",
    "password",
    "hash",
];

/// Top-level fields the routes understand. Anything else is logged.
pub const EXPECTED_FIELDS: &[&str] = &[
    "name",
    "text",
    "titleAr",
    "titleEn",
    "contentAr",
    "contentEn",
    "authorAr",
    "authorEn",
    "image",
    "imagePosition",
    "password",
    "captchaToken",
    "captchaAnswer",
];

/// Request payload after parsing
#[derive(Debug)]
enum Payload {
    /// `application/json`; `None` for an empty body
    Json(Option<Value>),
    /// `application/x-www-form-urlencoded`
    Form(SanitizedQuery),
    /// Anything else, passed through unread
    Opaque(Body),
}

impl Payload {
    fn surface(&self) -> String {
        match self {
            Payload::Json(Some(value)) => value.to_string(),
            Payload::Form(form) => form.to_json().to_string(),
            Payload::Json(None) | Payload::Opaque(_) => "{}".to_owned(),
        }
    }

    fn field_names(&self) -> Vec<String> {
        match self {
            Payload::Json(Some(Value::Object(map))) => map.keys().cloned().collect(),
            Payload::Form(form) => form.pairs.iter().map(|(k, _)| k.clone()).collect(),
            _ => Vec::new(),
        }
    }

    fn remove_field(&mut self, field: &str) {
        match self {
            Payload::Json(Some(Value::Object(map))) => {
                map.remove(field);
            }
            Payload::Form(form) => form.pairs.retain(|(k, _)| k != field),
            _ => {}
        }
    }

    fn into_body(self, headers: &mut HeaderMap) -> ShieldResult<Body> {
        let bytes = match self {
            Payload::Opaque(body) => return Ok(body),
            Payload::Json(None) => Bytes::new(),
            Payload::Json(Some(value)) => {
                Bytes::from(serde_json::to_vec(&value).map_err(ShieldError::InvalidJson)?)
            }
            Payload::Form(form) => {
                Bytes::from(form.encode().map_err(|_| ShieldError::InvalidQuery)?)
            }
        };
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(bytes.len()));
        Ok(Body::from(bytes))
    }
}

fn content_type(headers: &HeaderMap) -> &str {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

async fn read_limited(body: Body, headers: &HeaderMap, limit: usize) -> ShieldResult<Bytes> {
    if declared_length(headers).is_some_and(|len| len > limit) {
        return Err(ShieldError::PayloadTooLarge);
    }
    axum::body::to_bytes(body, limit)
        .await
        .map_err(|_| ShieldError::PayloadTooLarge)
}

async fn parse_payload(parts: &Parts, body: Body, limit: usize) -> ShieldResult<Payload> {
    let content_type = content_type(&parts.headers).to_ascii_lowercase();

    if content_type.starts_with("application/json") {
        let bytes = read_limited(body, &parts.headers, limit).await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Payload::Json(None));
        }
        let mut value: Value = serde_json::from_slice(&bytes).map_err(ShieldError::InvalidJson)?;
        sanitize::sanitize_value(&mut value);
        return Ok(Payload::Json(Some(value)));
    }

    if content_type.starts_with("application/x-www-form-urlencoded") {
        let bytes = read_limited(body, &parts.headers, limit).await?;
        let raw = std::str::from_utf8(&bytes).map_err(|_| ShieldError::InvalidQuery)?;
        let form = SanitizedQuery::parse(raw).map_err(|_| ShieldError::InvalidQuery)?;
        return Ok(Payload::Form(form));
    }

    Ok(Payload::Opaque(body))
}

/// Clean the query string and rewrite the URI with it
fn rewrite_query(uri: &Uri) -> ShieldResult<(Uri, SanitizedQuery)> {
    let Some(raw) = uri.query() else {
        return Ok((uri.clone(), SanitizedQuery::default()));
    };

    let query = SanitizedQuery::parse(raw).map_err(|_| ShieldError::InvalidQuery)?;
    let encoded = query.encode().map_err(|_| ShieldError::InvalidQuery)?;
    let path_and_query = if encoded.is_empty() {
        uri.path().to_owned()
    } else {
        format!("{}?{encoded}", uri.path())
    };

    let mut uri_parts = uri.clone().into_parts();
    uri_parts.path_and_query =
        Some(PathAndQuery::try_from(path_and_query).map_err(|_| ShieldError::InvalidQuery)?);
    let rewritten = Uri::from_parts(uri_parts).map_err(|_| ShieldError::InvalidQuery)?;
    Ok((rewritten, query))
}

fn check_patterns(shield: &Shield, ip: IpAddr, url: &str, surface: &str) -> ShieldResult<()> {
    if let Some(rule) = patterns::xss().classify(url) {
        tracing::warn!(ip = %ip, url, rule, "XSS pattern in request URL");
    }
    if let Some(rule) = patterns::rce().classify(surface) {
        let reputation = shield.reputation().record_attack(ip);
        tracing::error!(ip = %ip, url, rule, ?reputation, "RCE attempt blocked");
        return Err(ShieldError::SecurityViolation { rule });
    }
    Ok(())
}

fn check_blocklists(headers: &HeaderMap, ip: IpAddr, path: &str) -> ShieldResult<()> {
    if blocklist::is_blocked_path(path) {
        tracing::warn!(ip = %ip, path, "Blocked attack path");
        return Err(ShieldError::BlockedPath);
    }
    let user_agent = extract_user_agent(headers);
    if blocklist::is_suspicious_agent(user_agent) {
        tracing::warn!(ip = %ip, user_agent, "Blocked suspicious user agent");
        return Err(ShieldError::SuspiciousAgent);
    }
    Ok(())
}

fn check_replay(shield: &Shield, headers: &HeaderMap, ip: IpAddr) -> ShieldResult<()> {
    let Some(request_id) = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
    else {
        return Ok(());
    };
    if shield.replay().check_and_record(ip, request_id) {
        Ok(())
    } else {
        tracing::warn!(ip = %ip, request_id, "Replay blocked");
        Err(ShieldError::DuplicateRequest)
    }
}

fn strip_tampered_fields(payload: &mut Payload, path: &str) {
    let fields = payload.field_names();
    let privileged = path.contains("/admin") || path.contains("/auth");

    for field in &fields {
        if !privileged && PROTECTED_FIELDS.contains(&field.as_str()) {
            tracing::warn!(field = %field, path, "Parameter tampering blocked");
            payload.remove_field(field);
        } else if !EXPECTED_FIELDS.contains(&field.as_str()) && !field.starts_with('_') {
            tracing::debug!(field = %field, path, "Unexpected field");
        }
    }
}

async fn inspect_request(shield: &Shield, req: Request<Body>) -> ShieldResult<Request<Body>> {
    let path = request_path(&req);
    let (mut parts, body) = req.into_parts();
    let ip = request_client_ip(&parts.headers, &parts.extensions);

    if parts.method == Method::POST || parts.method == Method::DELETE {
        tracing::info!(method = %parts.method, path = %path, ip = %ip, "Write request");
    }

    let url = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_owned())
        .unwrap_or_else(|| path.clone());

    let mut payload = parse_payload(&parts, body, shield.config().max_body_bytes).await?;
    let (uri, query) = rewrite_query(&parts.uri)?;
    parts.uri = uri;

    let surface = format!("{url}{}{}", payload.surface(), query.to_json());
    check_patterns(shield, ip, &url, &surface)?;
    check_blocklists(&parts.headers, ip, &path)?;

    if shield.reputation().is_blocked(ip) {
        tracing::warn!(ip = %ip, path = %path, "Request from blocked IP");
        return Err(ShieldError::IpBlocked);
    }

    check_replay(shield, &parts.headers, ip)?;
    strip_tampered_fields(&mut payload, &path);

    let body = payload.into_body(&mut parts.headers)?;
    Ok(Request::from_parts(parts, body))
}

/// Inspection middleware, attached with `from_fn_with_state`
pub async fn inspect(State(shield): State<Shield>, req: Request<Body>, next: Next) -> Response {
    match inspect_request(&shield, req).await {
        Ok(req) => next.run(req).await,
        Err(e) => e.into_response(),
    }
}
