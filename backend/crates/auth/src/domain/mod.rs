//! Domain Layer
//!
//! Admin session entity, signed token and the session repository trait.

pub mod repository;
pub mod session;
pub mod token;

pub use repository::SessionRepository;
pub use session::{AdminSession, IpAdmission, SessionCheck, SessionPolicy};
pub use token::{TokenClaims, TokenError, TokenSigner};
