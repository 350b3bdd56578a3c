//! Presentation Layer
//!
//! HTTP handler, DTOs and router for the captcha API.

pub mod dto;
pub mod handlers;
pub mod router;
