//! Captcha Error Types
//!
//! Captcha-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Client-facing message for every verification failure. The variants only
/// differ in logs so a caller cannot probe which check failed.
pub const VERIFICATION_FAILED_MESSAGE: &str = "فشل التحقق - CAPTCHA verification failed";

/// Captcha-specific result type alias
pub type CaptchaResult<T> = Result<T, CaptchaError>;

/// Captcha-specific error variants
#[derive(Debug, Error)]
pub enum CaptchaError {
    /// Token or answer absent from the request
    #[error("Captcha token or answer missing")]
    Missing,

    /// Unknown or already consumed token
    #[error("Captcha not found or already used")]
    NotFound,

    /// Token outlived its TTL
    #[error("Captcha expired")]
    Expired,

    /// Answer did not match
    #[error("Captcha answer incorrect")]
    WrongAnswer,
}

impl CaptchaError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::BadRequest
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            CaptchaError::WrongAnswer => {
                tracing::warn!("Captcha answered incorrectly");
            }
            _ => {
                tracing::debug!(error = %self, "Captcha verification failed");
            }
        }
    }
}

impl From<CaptchaError> for AppError {
    fn from(err: CaptchaError) -> Self {
        AppError::new(err.kind(), VERIFICATION_FAILED_MESSAGE)
    }
}

impl IntoResponse for CaptchaError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}
