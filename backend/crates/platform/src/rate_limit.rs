//! Rate Limiting Infrastructure
//!
//! Fixed-window counters keyed by an arbitrary string (client IP, or
//! IP + path). Each key's window opens on its first hit and lasts
//! `window`; the counter resets when the window closes.

use std::time::Duration;

use dashmap::DashMap;

use crate::clock::{SharedClock, duration_ms};

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    pub fn window_ms(&self) -> i64 {
        duration_ms(self.window)
    }
}

/// Rate limit check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_at_ms: i64,
}

impl RateLimitResult {
    /// Whole seconds until the window resets, never negative
    pub fn reset_after_secs(&self, now_ms: i64) -> u64 {
        let remaining_ms = (self.reset_at_ms - now_ms).max(0) as u64;
        remaining_ms.div_ceil(1000)
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at_ms: i64,
}

/// In-process fixed-window store
#[derive(Debug)]
pub struct FixedWindowStore {
    windows: DashMap<String, Window>,
    clock: SharedClock,
}

impl FixedWindowStore {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            windows: DashMap::new(),
            clock,
        }
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    /// Count this request against `key` and report whether it is allowed.
    /// The read-modify-write for a key happens under that key's map entry.
    pub fn hit(&self, key: &str, config: &RateLimitConfig) -> RateLimitResult {
        let now_ms = self.clock.now_ms();
        let mut entry = self.windows.entry(key.to_owned()).or_insert(Window {
            count: 0,
            reset_at_ms: now_ms + config.window_ms(),
        });

        if now_ms >= entry.reset_at_ms {
            *entry = Window {
                count: 0,
                reset_at_ms: now_ms + config.window_ms(),
            };
        }

        entry.count = entry.count.saturating_add(1);

        RateLimitResult {
            allowed: entry.count <= config.max_requests,
            limit: config.max_requests,
            remaining: config.max_requests.saturating_sub(entry.count),
            reset_at_ms: entry.reset_at_ms,
        }
    }

    /// Drop closed windows. Returns how many were removed.
    pub fn cleanup(&self) -> usize {
        let now_ms = self.clock.now_ms();
        let before = self.windows.len();
        self.windows.retain(|_, w| w.reset_at_ms > now_ms);
        before.saturating_sub(self.windows.len())
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    #[test]
    fn test_allows_up_to_limit_then_rejects() {
        let clock = ManualClock::new(0);
        let store = FixedWindowStore::new(clock.clone());
        let config = RateLimitConfig::new(3, 60);

        for expected_remaining in [2, 1, 0] {
            let result = store.hit("1.2.3.4", &config);
            assert!(result.allowed);
            assert_eq!(result.remaining, expected_remaining);
        }

        let result = store.hit("1.2.3.4", &config);
        assert!(!result.allowed);
        assert_eq!(result.remaining, 0);
        assert_eq!(result.reset_at_ms, 60_000);
    }

    #[test]
    fn test_keys_are_independent() {
        let store = FixedWindowStore::new(ManualClock::new(0));
        let config = RateLimitConfig::new(1, 60);

        assert!(store.hit("a", &config).allowed);
        assert!(!store.hit("a", &config).allowed);
        assert!(store.hit("b", &config).allowed);
    }

    #[test]
    fn test_window_resets() {
        let clock = ManualClock::new(0);
        let store = FixedWindowStore::new(clock.clone());
        let config = RateLimitConfig::new(1, 60);

        assert!(store.hit("k", &config).allowed);
        assert!(!store.hit("k", &config).allowed);

        clock.advance(Duration::from_secs(60));
        let result = store.hit("k", &config);
        assert!(result.allowed);
        assert_eq!(result.reset_at_ms, 120_000);
    }

    #[test]
    fn test_cleanup_removes_closed_windows() {
        let clock = ManualClock::new(0);
        let store = FixedWindowStore::new(clock.clone());
        store.hit("old", &RateLimitConfig::new(5, 60));
        store.hit("long", &RateLimitConfig::new(5, 3600));

        clock.advance(Duration::from_secs(61));
        assert_eq!(store.cleanup(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_reset_after_secs_rounds_up() {
        let result = RateLimitResult {
            allowed: false,
            limit: 1,
            remaining: 0,
            reset_at_ms: 1_500,
        };
        assert_eq!(result.reset_after_secs(0), 2);
        assert_eq!(result.reset_after_secs(5_000), 0);
    }
}
