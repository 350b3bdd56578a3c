//! API DTOs (Data Transfer Objects)

use serde::Serialize;

/// Response for GET /api/captcha
#[derive(Debug, Clone, Serialize)]
pub struct CaptchaResponse {
    pub token: String,
    pub question: String,
}
