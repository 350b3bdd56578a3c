//! Repository Traits
//!
//! Interfaces for session persistence. Implementation is in infrastructure
//! layer. Every method that reads and then changes a session does so as one
//! step for that session.

use std::net::IpAddr;

use kernel::id::SessionId;

use crate::domain::session::{AdminSession, SessionCheck, SessionPolicy};

/// Admin session repository trait
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    /// Store a new session
    async fn create(&self, session: AdminSession);

    /// Remove a session. Returns whether it existed.
    async fn delete(&self, session_id: &SessionId) -> bool;

    /// Strict check for admin requests: admit the IP or delete a full
    /// session, and record activity on success.
    async fn authorize(
        &self,
        session_id: &SessionId,
        ip: IpAddr,
        now_ms: i64,
        policy: &SessionPolicy,
    ) -> SessionCheck;

    /// Lenient check for token verification: admit the IP when there is
    /// room, never delete, never record activity.
    async fn observe(
        &self,
        session_id: &SessionId,
        ip: IpAddr,
        now_ms: i64,
        policy: &SessionPolicy,
    ) -> SessionCheck;

    /// Remove idle sessions. Returns how many were removed.
    async fn purge_idle(&self, now_ms: i64, policy: &SessionPolicy) -> usize;
}
