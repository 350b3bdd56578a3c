//! In-memory Repository Implementation

use std::net::IpAddr;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use kernel::id::SessionId;

use crate::domain::repository::SessionRepository;
use crate::domain::session::{AdminSession, IpAdmission, SessionCheck, SessionPolicy};

/// Process-local admin session store
#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    sessions: DashMap<SessionId, AdminSession>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, session_id: &SessionId) -> Option<AdminSession> {
        self.sessions.get(session_id).map(|s| s.clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn check(
        &self,
        session_id: &SessionId,
        ip: IpAddr,
        now_ms: i64,
        policy: &SessionPolicy,
        strict: bool,
    ) -> SessionCheck {
        let Entry::Occupied(mut entry) = self.sessions.entry(*session_id) else {
            return SessionCheck::Missing;
        };

        if entry.get().is_idle(now_ms, policy) {
            entry.remove();
            return SessionCheck::Missing;
        }

        let session = entry.get_mut();
        match session.admit_ip(ip, policy) {
            IpAdmission::Rejected if strict => {
                entry.remove();
                SessionCheck::IpLimitExceeded
            }
            IpAdmission::Rejected => SessionCheck::Admitted(IpAdmission::Rejected),
            admission => {
                if admission == IpAdmission::Added {
                    tracing::info!(session_id = %session_id, ip = %ip, "New IP added to session");
                }
                if strict {
                    session.touch(now_ms);
                }
                SessionCheck::Admitted(admission)
            }
        }
    }
}

impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, session: AdminSession) {
        self.sessions.insert(session.session_id, session);
    }

    async fn delete(&self, session_id: &SessionId) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    async fn authorize(
        &self,
        session_id: &SessionId,
        ip: IpAddr,
        now_ms: i64,
        policy: &SessionPolicy,
    ) -> SessionCheck {
        self.check(session_id, ip, now_ms, policy, true)
    }

    async fn observe(
        &self,
        session_id: &SessionId,
        ip: IpAddr,
        now_ms: i64,
        policy: &SessionPolicy,
    ) -> SessionCheck {
        self.check(session_id, ip, now_ms, policy, false)
    }

    async fn purge_idle(&self, now_ms: i64, policy: &SessionPolicy) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| !s.is_idle(now_ms, policy));
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            tracing::debug!(removed, "Purged idle admin sessions");
        }
        removed
    }
}
