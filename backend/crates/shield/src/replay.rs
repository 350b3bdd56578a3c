//! Replay Guard
//!
//! Remembers `(client IP, X-Request-ID)` pairs for a fixed window. A pair
//! seen again inside the window is a replay.

use std::net::IpAddr;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use platform::clock::SharedClock;

/// Header carrying the client-chosen request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug)]
pub struct ReplayGuard {
    seen: DashMap<String, i64>,
    window_ms: i64,
    clock: SharedClock,
}

impl ReplayGuard {
    pub fn new(window_ms: i64, clock: SharedClock) -> Self {
        Self {
            seen: DashMap::new(),
            window_ms,
            clock,
        }
    }

    fn key(ip: IpAddr, request_id: &str) -> String {
        format!("{ip}:{request_id}")
    }

    /// Record the pair. Returns `false` when it was already seen within the
    /// window; the original first-seen time is kept in that case.
    pub fn check_and_record(&self, ip: IpAddr, request_id: &str) -> bool {
        let now_ms = self.clock.now_ms();
        match self.seen.entry(Self::key(ip, request_id)) {
            Entry::Occupied(mut entry) => {
                if now_ms - *entry.get() < self.window_ms {
                    return false;
                }
                entry.insert(now_ms);
                true
            }
            Entry::Vacant(entry) => {
                entry.insert(now_ms);
                true
            }
        }
    }

    /// Drop expired pairs. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let now_ms = self.clock.now_ms();
        let before = self.seen.len();
        self.seen.retain(|_, first_seen| now_ms - *first_seen < self.window_ms);
        before.saturating_sub(self.seen.len())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
