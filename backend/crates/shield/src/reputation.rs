//! IP Reputation
//!
//! Failure weight per client IP. Failed admin logins and injection attempts
//! add weight; once the weight reaches the block threshold the IP is
//! rejected until the block duration has passed since its last failure.
//!
//! State per IP: `Clean` (no record) -> `Watched` -> `Blocked` -> `Clean`.

use std::net::IpAddr;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use platform::clock::SharedClock;

use crate::config::ReputationConfig;

/// Externally visible state of one IP
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reputation {
    /// No failures on record
    Clean,
    /// Some failures, still below the threshold
    Watched { failures: u32 },
    /// Rejected until `until_ms`
    Blocked { until_ms: i64 },
}

impl Reputation {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Reputation::Blocked { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpRecord {
    pub failure_count: u32,
    pub last_attempt_at_ms: i64,
}

impl IpRecord {
    /// A record whose last failure is older than the block duration is
    /// forgotten, blocked or not.
    fn is_stale(&self, now_ms: i64, config: &ReputationConfig) -> bool {
        now_ms - self.last_attempt_at_ms >= config.block_duration_ms()
    }

    fn reputation(&self, config: &ReputationConfig) -> Reputation {
        if self.failure_count >= config.block_threshold {
            Reputation::Blocked {
                until_ms: self.last_attempt_at_ms + config.block_duration_ms(),
            }
        } else {
            Reputation::Watched {
                failures: self.failure_count,
            }
        }
    }
}

/// In-process reputation store
#[derive(Debug)]
pub struct ReputationStore {
    records: DashMap<IpAddr, IpRecord>,
    config: ReputationConfig,
    clock: SharedClock,
}

impl ReputationStore {
    pub fn new(config: ReputationConfig, clock: SharedClock) -> Self {
        Self {
            records: DashMap::new(),
            config,
            clock,
        }
    }

    pub fn config(&self) -> &ReputationConfig {
        &self.config
    }

    /// Current state. A stale record is removed on the way.
    pub fn status(&self, ip: IpAddr) -> Reputation {
        let now_ms = self.clock.now_ms();
        match self.records.entry(ip) {
            Entry::Occupied(entry) if entry.get().is_stale(now_ms, &self.config) => {
                entry.remove();
                tracing::info!(ip = %ip, "IP reputation expired");
                Reputation::Clean
            }
            Entry::Occupied(entry) => entry.get().reputation(&self.config),
            Entry::Vacant(_) => Reputation::Clean,
        }
    }

    pub fn is_blocked(&self, ip: IpAddr) -> bool {
        self.status(ip).is_blocked()
    }

    /// Add `weight` to the IP's failure count and return the new state
    pub fn penalize(&self, ip: IpAddr, weight: u32) -> Reputation {
        let now_ms = self.clock.now_ms();
        let mut record = self.records.entry(ip).or_insert(IpRecord {
            failure_count: 0,
            last_attempt_at_ms: now_ms,
        });
        if record.is_stale(now_ms, &self.config) {
            record.failure_count = 0;
        }
        record.failure_count = record.failure_count.saturating_add(weight);
        record.last_attempt_at_ms = now_ms;

        let reputation = record.reputation(&self.config);
        if reputation.is_blocked() {
            tracing::warn!(ip = %ip, failures = record.failure_count, "IP blocked");
        }
        reputation
    }

    pub fn record_failed_login(&self, ip: IpAddr) -> Reputation {
        self.penalize(ip, self.config.failed_login_penalty)
    }

    pub fn record_attack(&self, ip: IpAddr) -> Reputation {
        self.penalize(ip, self.config.attack_penalty)
    }

    /// Forget the IP, as after a successful login
    pub fn clear(&self, ip: IpAddr) {
        self.records.remove(&ip);
    }

    /// Remove every stale record. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let now_ms = self.clock.now_ms();
        let before = self.records.len();
        self.records.retain(|_, r| !r.is_stale(now_ms, &self.config));
        before.saturating_sub(self.records.len())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::clock::ManualClock;
    use std::time::Duration;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    fn store() -> (ReputationStore, std::sync::Arc<ManualClock>) {
        let clock = ManualClock::new(1_000_000);
        (
            ReputationStore::new(ReputationConfig::default(), clock.clone()),
            clock,
        )
    }

    #[test]
    fn test_unknown_ip_is_clean() {
        let (store, _) = store();
        assert_eq!(store.status(ip("10.0.0.1")), Reputation::Clean);
        assert!(store.is_empty());
    }

    #[test]
    fn test_five_failed_logins_block() {
        let (store, _) = store();
        let addr = ip("10.0.0.1");
        for n in 1..5 {
            assert_eq!(
                store.record_failed_login(addr),
                Reputation::Watched { failures: n }
            );
        }
        assert_eq!(
            store.record_failed_login(addr),
            Reputation::Blocked {
                until_ms: 1_000_000 + 3_600_000
            }
        );
        assert!(store.is_blocked(addr));
        assert!(!store.is_blocked(ip("10.0.0.2")));
    }

    #[test]
    fn test_attack_blocks_immediately() {
        let (store, _) = store();
        let addr = ip("2001:db8::1");
        assert!(store.record_attack(addr).is_blocked());
    }

    #[test]
    fn test_block_clears_after_an_hour() {
        let (store, clock) = store();
        let addr = ip("10.0.0.1");
        store.record_attack(addr);

        clock.advance(Duration::from_secs(3599));
        assert!(store.is_blocked(addr));

        clock.advance(Duration::from_secs(1));
        assert_eq!(store.status(addr), Reputation::Clean);
        assert!(store.is_empty());
    }

    #[test]
    fn test_failure_extends_block() {
        let (store, clock) = store();
        let addr = ip("10.0.0.1");
        store.record_attack(addr);
        clock.advance(Duration::from_secs(1800));
        store.record_failed_login(addr);
        clock.advance(Duration::from_secs(1800));
        assert!(store.is_blocked(addr));
    }

    #[test]
    fn test_stale_watch_restarts_count() {
        let (store, clock) = store();
        let addr = ip("10.0.0.1");
        for _ in 0..4 {
            store.record_failed_login(addr);
        }
        clock.advance(Duration::from_secs(3600));
        assert_eq!(
            store.record_failed_login(addr),
            Reputation::Watched { failures: 1 }
        );
    }

    #[test]
    fn test_clear_removes_record() {
        let (store, _) = store();
        let addr = ip("10.0.0.1");
        store.record_failed_login(addr);
        store.clear(addr);
        assert_eq!(store.status(addr), Reputation::Clean);
    }

    #[test]
    fn test_sweep_removes_stale_records_only() {
        let (store, clock) = store();
        store.record_attack(ip("10.0.0.1"));
        store.record_failed_login(ip("10.0.0.2"));
        clock.advance(Duration::from_secs(3000));
        store.record_failed_login(ip("10.0.0.3"));
        clock.advance(Duration::from_secs(600));

        assert_eq!(store.sweep(), 2);
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.status(ip("10.0.0.3")),
            Reputation::Watched { failures: 1 }
        );
    }
}
