//! Sliding fixed-window rate limiter (§4.3 step 4).

use dashmap::DashMap;
use overseer_core::types::{ApiKeyId, Timestamp};
use parking_lot::Mutex;

struct Window {
    started_at: Timestamp,
    count: u32,
}

/// Per-key sliding fixed-window counter, backed by an in-process map with
/// explicit expiry evaluated on each access (§5 "Fallback: an in-process map
/// protected by a mutex with explicit expiry timestamps").
///
/// Atomicity: `check_and_increment` holds the per-key lock for the duration
/// of the read-reset-increment sequence, so concurrent callers against the
/// same key never both observe room under the cap and both increment past it.
#[derive(Default)]
pub struct RateLimiter {
    windows: DashMap<ApiKeyId, Mutex<Window>>,
}

impl RateLimiter {
    /// Create an empty limiter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check and, if allowed, increment the counter for `key_id`. Returns
    /// `true` if the request is within `per_minute` for the current window,
    /// `false` if it should be rejected with 429.
    pub fn check_and_increment(&self, key_id: &ApiKeyId, per_minute: u32, window_seconds: u64) -> bool {
        let entry = self
            .windows
            .entry(key_id.clone())
            .or_insert_with(|| {
                Mutex::new(Window {
                    started_at: Timestamp::now(),
                    count: 0,
                })
            });
        let mut window = entry.lock();

        let now = Timestamp::now();
        let elapsed = (now.0 - window.started_at.0).num_seconds().max(0) as u64;
        if elapsed >= window_seconds {
            window.started_at = now;
            window.count = 0;
        }

        if window.count >= per_minute {
            return false;
        }
        window.count += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_the_cap_then_rejects() {
        let limiter = RateLimiter::new();
        let key = ApiKeyId("key_1".to_string());
        for _ in 0..3 {
            assert!(limiter.check_and_increment(&key, 3, 60));
        }
        assert!(!limiter.check_and_increment(&key, 3, 60));
    }

    #[test]
    fn separate_keys_have_independent_windows() {
        let limiter = RateLimiter::new();
        let a = ApiKeyId("key_a".to_string());
        let b = ApiKeyId("key_b".to_string());
        for _ in 0..2 {
            assert!(limiter.check_and_increment(&a, 2, 60));
        }
        assert!(!limiter.check_and_increment(&a, 2, 60));
        assert!(limiter.check_and_increment(&b, 2, 60));
    }
}
