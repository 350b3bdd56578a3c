//! Content API
//!
//! Stats, comments, articles and admin image upload. Handlers are thin:
//! every request has already passed the shield pipeline, so bodies arrive
//! sanitized and only shape and length rules are checked here.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod model;
pub mod repository;
pub mod router;
pub mod upload;

pub use handlers::ContentAppState;
pub use memory::InMemoryContentRepository;
pub use router::content_router;
