//! Shield - Request Security Pipeline
//!
//! Every request passes one deterministic, short-circuiting chain before it
//! reaches a route:
//!
//! 1. client IP resolution and security response headers
//! 2. general rate limiting (`/api/` only, static assets exempt)
//! 3. CORS
//! 4. inspection: body size limit, sanitization, parameter-pollution guard,
//!    pattern guards (XSS logged, RCE rejected), path/user-agent blocklist,
//!    IP reputation gate, replay guard, field tampering guard
//!
//! Route-level layers (mutation and sensitive-operation limiters) are
//! exported for the application router to attach per route.
//!
//! All state lives in explicit stores owned by [`Shield`]; there are no
//! module-level registries.

pub mod blocklist;
pub mod config;
pub mod cors;
pub mod error;
pub mod headers;
pub mod inspect;
pub mod limiter;
pub mod patterns;
pub mod pipeline;
pub mod replay;
pub mod reputation;
pub mod sanitize;

pub use config::{ReputationConfig, ShieldConfig};
pub use error::{ShieldError, ShieldResult};
pub use pipeline::{Shield, SweepReport};
pub use reputation::{Reputation, ReputationStore};
