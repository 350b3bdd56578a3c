//! Auth Error Types
//!
//! Auth-specific variants that integrate with the unified
//! `kernel::error::AppError` system. Only `InvalidCredentials` feeds the IP
//! reputation store; the rest are plain rejections.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Login body without a usable password
    #[error("Password required")]
    PasswordRequired,

    /// Client IP is blocked by reputation
    #[error("Too many failed attempts. Try again later.")]
    IpBlocked,

    /// Wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No bearer token
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Token is forged, expired or not an admin token
    #[error("Admin access required")]
    AdminRequired,

    /// Token names a session that no longer exists
    #[error("Session expired")]
    SessionExpired,

    /// Session used from one IP too many; it has been deleted
    #[error("Session invalid - too many IP changes")]
    TooManyIpChanges,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::PasswordRequired => StatusCode::BAD_REQUEST,
            AuthError::IpBlocked | AuthError::AdminRequired => StatusCode::FORBIDDEN,
            AuthError::InvalidCredentials
            | AuthError::AuthenticationRequired
            | AuthError::SessionExpired
            | AuthError::TooManyIpChanges => StatusCode::UNAUTHORIZED,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::PasswordRequired => ErrorKind::BadRequest,
            AuthError::IpBlocked | AuthError::AdminRequired => ErrorKind::Forbidden,
            AuthError::InvalidCredentials
            | AuthError::AuthenticationRequired
            | AuthError::SessionExpired
            | AuthError::TooManyIpChanges => ErrorKind::Unauthorized,
            AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::Internal(_) => AppError::internal("Authentication error"),
            other => AppError::new(other.kind(), other.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Internal(msg) => {
                tracing::error!(error = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::IpBlocked => {
                tracing::warn!("Login attempt from blocked IP");
            }
            AuthError::TooManyIpChanges => {
                tracing::warn!("Session revoked after too many IP changes");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        err.to_app_error()
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<platform::password::PasswordHashError> for AuthError {
    fn from(err: platform::password::PasswordHashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}
