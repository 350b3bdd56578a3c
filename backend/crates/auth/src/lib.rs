//! Auth (Admin Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Admin session entity, signed token, repository trait
//! - `application/` - Login, logout, verify and authorize use cases
//! - `infra/` - In-memory session store
//! - `presentation/` - HTTP handlers, DTOs, `require_admin` middleware, router
//!
//! ## Security Model
//! - One admin credential, kept as an Argon2id PHC hash
//! - Failed logins feed the shield's IP reputation; success clears it
//! - A signed token is never enough on its own: its session id must resolve
//!   to a live server-side session
//! - A session tolerates a bounded number of client IPs and dies when one
//!   more appears

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

pub use application::config::AuthConfig;
pub use domain::token::TokenClaims;
pub use error::{AuthError, AuthResult};
pub use infra::memory::InMemorySessionRepository;
pub use presentation::handlers::AuthAppState;
pub use presentation::middleware::require_admin;
pub use presentation::router::auth_router;
