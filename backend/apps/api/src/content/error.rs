//! Content Error Types
//!
//! Validation failures for the content routes, rendered through
//! `kernel::error::AppError`. Upload messages are in Arabic, matching the
//! admin panel.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use captcha::CaptchaError;
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

pub type ContentResult<T> = Result<T, ContentError>;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error(transparent)]
    Captcha(#[from] CaptchaError),

    #[error("Missing fields")]
    MissingFields,

    #[error("Invalid input type")]
    InvalidInputType,

    #[error("Input too long")]
    InputTooLong,

    #[error("Missing required fields (titleAr, contentAr)")]
    MissingArticleFields,

    #[error("Content too long")]
    ContentTooLong,

    #[error("Invalid image URL")]
    InvalidImageUrl,

    #[error("Invalid article ID")]
    InvalidArticleId,

    #[error("Article not found")]
    ArticleNotFound,

    #[error("Comment text is required")]
    CommentTextRequired,

    #[error("لم يتم اختيار صورة")]
    NoImage,

    #[error("حجم الصورة كبير جداً (الحد الأقصى 2MB)")]
    ImageTooLarge,

    #[error("نوع الملف غير مدعوم. الأنواع المسموحة: JPEG, PNG, GIF, WebP")]
    UnsupportedImageType,

    #[error("خطأ في رفع الصورة: {0}")]
    Multipart(String),
}

impl ContentError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ContentError::Captcha(e) => e.status_code(),
            ContentError::ArticleNotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ContentError::Captcha(e) => e.kind(),
            ContentError::ArticleNotFound => ErrorKind::NotFound,
            _ => ErrorKind::BadRequest,
        }
    }

    fn log(&self) {
        match self {
            ContentError::Multipart(reason) => {
                tracing::warn!(reason = %reason, "Image upload failed");
            }
            ContentError::UnsupportedImageType | ContentError::ImageTooLarge => {
                tracing::warn!(error = %self, "Image upload rejected");
            }
            _ => tracing::debug!(error = %self, "Content request rejected"),
        }
    }
}

impl From<ContentError> for AppError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::Captcha(e) => e.into(),
            other => AppError::new(other.kind(), other.to_string()),
        }
    }
}

impl IntoResponse for ContentError {
    fn into_response(self) -> Response {
        match self {
            ContentError::Captcha(e) => e.into_response(),
            other => {
                other.log();
                AppError::from(other).into_response()
            }
        }
    }
}
