//! CAPTCHA Backend Module
//!
//! Short-lived, single-use arithmetic challenges gating public writes.
//!
//! Clean Architecture structure:
//! - `domain/` - Math problems, captcha entity, answer parsing, repository trait
//! - `application/` - Issue and verify use cases
//! - `infra/` - In-memory repository
//! - `presentation/` - HTTP handler and router
//!
//! ## Security Model
//! - The expected answer never leaves the server
//! - A token is removed on its first verification attempt, pass or fail
//! - Expired tokens fail even when the answer is right

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::CaptchaConfig;
pub use application::verify_captcha::VerifyCaptchaInput;
pub use error::{CaptchaError, CaptchaResult};
pub use infra::memory::InMemoryCaptchaRepository;
pub use presentation::handlers::CaptchaAppState;
pub use presentation::router::captcha_router;
