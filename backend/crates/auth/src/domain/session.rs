//! Admin Session Entity
//!
//! Server-side record behind every admin token. Besides inactivity expiry, a
//! session remembers which client IPs have used it and refuses to grow past
//! [`SessionPolicy::max_ips`].

use std::net::IpAddr;

use kernel::id::SessionId;

/// Limits applied to every session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    /// Distinct client IPs a session may be used from
    pub max_ips: usize,
    /// Inactivity after which a session is gone
    pub idle_timeout_ms: i64,
}

/// Outcome of presenting an IP to a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpAdmission {
    /// IP already on the session
    Known,
    /// IP appended to the session
    Added,
    /// IP is new and the session is full
    Rejected,
}

/// Outcome of a repository-level session check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCheck {
    /// No live session under that id
    Missing,
    /// Session was full and has been deleted
    IpLimitExceeded,
    /// Session is live and the IP is accepted
    Admitted(IpAdmission),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    pub session_id: SessionId,
    /// IP the login came from
    pub origin_ip: IpAddr,
    /// Every IP accepted so far, login IP first
    pub allowed_ips: Vec<IpAddr>,
    pub user_agent: String,
    pub last_activity_at_ms: i64,
}

impl AdminSession {
    pub fn new(origin_ip: IpAddr, user_agent: impl Into<String>, now_ms: i64) -> Self {
        Self {
            session_id: SessionId::new(),
            origin_ip,
            allowed_ips: vec![origin_ip],
            user_agent: user_agent.into(),
            last_activity_at_ms: now_ms,
        }
    }

    pub fn is_idle(&self, now_ms: i64, policy: &SessionPolicy) -> bool {
        now_ms - self.last_activity_at_ms > policy.idle_timeout_ms
    }

    /// Accept `ip` if known or if there is room for it
    pub fn admit_ip(&mut self, ip: IpAddr, policy: &SessionPolicy) -> IpAdmission {
        if self.allowed_ips.contains(&ip) {
            return IpAdmission::Known;
        }
        if self.allowed_ips.len() < policy.max_ips {
            self.allowed_ips.push(ip);
            return IpAdmission::Added;
        }
        IpAdmission::Rejected
    }

    /// Record activity
    pub fn touch(&mut self, now_ms: i64) {
        self.last_activity_at_ms = now_ms;
    }
}
