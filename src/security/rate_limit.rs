//! Fixed-window rate limiting keyed by client.
//!
//! # Algorithm
//! Each client key owns a counter and a window deadline. A request inside
//! the window increments the counter until the limit; the first request
//! after the deadline replaces the record with a fresh window. Rejected
//! requests never consume quota.
//!
//! # Shared State
//! The table is the only cross-request state in the gateway. It lives
//! behind one mutex so the lookup-check-update sequence for a key is a
//! single indivisible step; two concurrent requests from the same client
//! can never both claim the last slot. Records survive only as long as
//! the process, which is accepted behavior for this service.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::broadcast;

use crate::config::RateLimitConfig;
use crate::observability::metrics;

/// Per-key admission record.
#[derive(Debug, Clone, Copy)]
struct WindowRecord {
    count: u32,
    window_reset_at: Instant,
}

/// Keyed fixed-window counter store.
///
/// Injected into the request handler rather than held as a global, so
/// tests can run against isolated instances.
pub struct FixedWindowLimiter {
    records: Mutex<HashMap<String, WindowRecord>>,
    max_requests: u32,
    window: Duration,
}

impl FixedWindowLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            max_requests,
            window,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, Duration::from_secs(config.window_secs))
    }

    /// Admit or reject a request from `key` at the current time.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    /// Admission decision at an explicit point in time.
    fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut records = self.records.lock().expect("rate limiter mutex poisoned");
        match records.get_mut(key) {
            Some(record) if now <= record.window_reset_at => {
                if record.count < self.max_requests {
                    record.count += 1;
                    true
                } else {
                    false
                }
            }
            _ => {
                // First sighting of the key, or its window has lapsed.
                records.insert(
                    key.to_string(),
                    WindowRecord {
                        count: 1,
                        window_reset_at: now + self.window,
                    },
                );
                true
            }
        }
    }

    /// Drop records whose window lapsed more than one full window ago.
    ///
    /// Records inside the grace margin are kept: a record whose window
    /// just lapsed would be replaced on the key's next request anyway, so
    /// the margin guarantees the sweep never changes an admission
    /// decision.
    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Instant::now())
    }

    fn sweep_expired_at(&self, now: Instant) -> usize {
        let mut records = self.records.lock().expect("rate limiter mutex poisoned");
        let before = records.len();
        records.retain(|_, record| now < record.window_reset_at + self.window);
        before - records.len()
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.records
            .lock()
            .expect("rate limiter mutex poisoned")
            .len()
    }
}

/// Periodically evict stale records until shutdown is signalled.
pub async fn run_sweeper(
    limiter: Arc<FixedWindowLimiter>,
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(interval);
    // The first tick fires immediately; skip it so a fresh table is not
    // swept at startup.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let removed = limiter.sweep_expired();
                if removed > 0 {
                    tracing::debug!(
                        removed_records = removed,
                        tracked_keys = limiter.tracked_keys(),
                        "Rate limiter sweep completed"
                    );
                    metrics::record_sweep(removed);
                }
            }
            _ = shutdown.recv() => {
                tracing::info!("Rate limiter sweeper received shutdown signal, exiting loop");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window_secs: u64) -> FixedWindowLimiter {
        FixedWindowLimiter::new(max_requests, Duration::from_secs(window_secs))
    }

    #[test]
    fn admits_up_to_the_limit_then_rejects() {
        let limiter = limiter(10, 60);
        let now = Instant::now();

        for i in 0..10 {
            assert!(limiter.check_at("1.2.3.4", now), "request {} should pass", i + 1);
        }
        assert!(!limiter.check_at("1.2.3.4", now), "11th request must be rejected");
    }

    #[test]
    fn rejected_requests_do_not_consume_quota() {
        let limiter = limiter(3, 60);
        let now = Instant::now();

        for _ in 0..3 {
            assert!(limiter.check_at("k", now));
        }
        for _ in 0..5 {
            assert!(!limiter.check_at("k", now));
        }

        // The counter stayed at the limit, so the next window grants the
        // full quota again.
        let later = now + Duration::from_secs(61);
        for _ in 0..3 {
            assert!(limiter.check_at("k", later));
        }
    }

    #[test]
    fn window_boundary_resets_the_count() {
        let limiter = limiter(2, 60);
        let now = Instant::now();

        assert!(limiter.check_at("k", now));
        assert!(limiter.check_at("k", now));
        assert!(!limiter.check_at("k", now));

        // Exactly at the deadline the old window still applies.
        assert!(!limiter.check_at("k", now + Duration::from_secs(60)));

        // Past the deadline a fresh window starts with count = 1.
        let later = now + Duration::from_secs(60) + Duration::from_millis(1);
        assert!(limiter.check_at("k", later));
        assert!(limiter.check_at("k", later));
        assert!(!limiter.check_at("k", later));
    }

    #[test]
    fn keys_are_independent() {
        let limiter = limiter(1, 60);
        let now = Instant::now();

        assert!(limiter.check_at("a", now));
        assert!(!limiter.check_at("a", now));
        assert!(limiter.check_at("b", now));
    }

    #[test]
    fn sweep_removes_only_long_expired_records() {
        let limiter = limiter(5, 60);
        let now = Instant::now();

        assert!(limiter.check_at("old", now));
        assert!(limiter.check_at("fresh", now + Duration::from_secs(90)));
        assert_eq!(limiter.tracked_keys(), 2);

        // "old" expired at +60s and its grace margin ends at +120s.
        assert_eq!(limiter.sweep_expired_at(now + Duration::from_secs(119)), 0);
        assert_eq!(limiter.sweep_expired_at(now + Duration::from_secs(121)), 1);
        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[test]
    fn shared_reference_sees_one_table() {
        let limiter = Arc::new(limiter(2, 60));
        let now = Instant::now();
        let other = limiter.clone();

        assert!(limiter.check_at("k", now));
        assert!(other.check_at("k", now));
        assert!(!limiter.check_at("k", now));
    }
}
