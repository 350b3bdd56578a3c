//! Application Layer
//!
//! Use cases and application services.

pub mod authorize;
pub mod config;
pub mod login;
pub mod logout;
pub mod verify;

// Re-exports
pub use authorize::AuthorizeUseCase;
pub use config::AuthConfig;
pub use login::{LoginInput, LoginOutput, LoginUseCase};
pub use logout::LogoutUseCase;
pub use verify::{VerifyOutput, VerifyUseCase};
