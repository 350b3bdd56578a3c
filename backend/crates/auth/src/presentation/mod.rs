//! Presentation Layer
//!
//! HTTP handlers, DTOs, the admin gate middleware and the router.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;
