//! Shield Error Types
//!
//! Terminal outcomes of the security pipeline. Each variant short-circuits
//! the request with its own status and message, and integrates with the
//! unified `kernel::error::AppError` system.

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Shield-specific result type alias
pub type ShieldResult<T> = Result<T, ShieldError>;

/// Why the pipeline stopped a request
#[derive(Debug, Error)]
pub enum ShieldError {
    /// A fixed-window limiter is exhausted
    #[error("{message}")]
    RateLimited {
        message: &'static str,
        limit: u32,
        reset_after_secs: u64,
    },

    /// Body exceeds the configured size limit
    #[error("Payload too large")]
    PayloadTooLarge,

    /// JSON body failed to parse
    #[error("Invalid JSON payload")]
    InvalidJson(#[source] serde_json::Error),

    /// Query string or form body could not be decoded or rebuilt
    #[error("Invalid query string")]
    InvalidQuery,

    /// Injection / remote code execution pattern matched
    #[error("Access denied - Security violation")]
    SecurityViolation { rule: &'static str },

    /// Known attack probe path
    #[error("Not Found")]
    BlockedPath,

    /// Scanner user agent
    #[error("Access denied")]
    SuspiciousAgent,

    /// IP reputation is in the blocked state
    #[error("Too many failed attempts. Try again later.")]
    IpBlocked,

    /// `X-Request-ID` already seen within the replay window
    #[error("Duplicate request")]
    DuplicateRequest,
}

impl ShieldError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ShieldError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ShieldError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ShieldError::InvalidJson(_) | ShieldError::InvalidQuery => StatusCode::BAD_REQUEST,
            ShieldError::SecurityViolation { .. }
            | ShieldError::SuspiciousAgent
            | ShieldError::IpBlocked => StatusCode::FORBIDDEN,
            ShieldError::BlockedPath => StatusCode::NOT_FOUND,
            ShieldError::DuplicateRequest => StatusCode::CONFLICT,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShieldError::RateLimited { .. } => ErrorKind::TooManyRequests,
            ShieldError::PayloadTooLarge => ErrorKind::PayloadTooLarge,
            ShieldError::InvalidJson(_) | ShieldError::InvalidQuery => ErrorKind::BadRequest,
            ShieldError::SecurityViolation { .. }
            | ShieldError::SuspiciousAgent
            | ShieldError::IpBlocked => ErrorKind::Forbidden,
            ShieldError::BlockedPath => ErrorKind::NotFound,
            ShieldError::DuplicateRequest => ErrorKind::Conflict,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            ShieldError::SecurityViolation { rule } => {
                tracing::error!(rule = *rule, "Injection attempt blocked");
            }
            ShieldError::RateLimited { message, .. } => {
                tracing::warn!(reason = *message, "Rate limit exceeded");
            }
            ShieldError::InvalidJson(e) => {
                tracing::debug!(error = %e, "Rejected malformed JSON body");
            }
            _ => {
                tracing::warn!(error = %self, "Request rejected by shield");
            }
        }
    }
}

impl From<ShieldError> for AppError {
    fn from(err: ShieldError) -> Self {
        AppError::new(err.kind(), err.to_string())
    }
}

impl IntoResponse for ShieldError {
    fn into_response(self) -> Response {
        self.log();
        match self {
            // Probes get the same bare page as any unknown static path
            ShieldError::BlockedPath => (StatusCode::NOT_FOUND, "Not Found").into_response(),
            ShieldError::RateLimited {
                limit,
                reset_after_secs,
                ..
            } => {
                let mut response = AppError::from(self).into_response();
                let headers = response.headers_mut();
                headers.insert("ratelimit-limit", HeaderValue::from(limit));
                headers.insert("ratelimit-remaining", HeaderValue::from(0u32));
                headers.insert("ratelimit-reset", HeaderValue::from(reset_after_secs));
                response
            }
            other => AppError::from(other).into_response(),
        }
    }
}
