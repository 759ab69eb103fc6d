//! Per-request and daily token budget guards (§4.3 step 5).

use dashmap::DashMap;
use overseer_core::types::{ApiKeyId, Timestamp};
use parking_lot::Mutex;

struct DailyCounter {
    day: String,
    spent: i64,
}

/// Tracks cumulative accepted tokens per key per rolling UTC calendar day.
///
/// The per-request check (`budget_tokens <= max_per_request`) is stateless
/// and performed inline by the caller; this type only needs to track the
/// stateful daily rollup.
#[derive(Default)]
pub struct BudgetGuard {
    daily: DashMap<ApiKeyId, Mutex<DailyCounter>>,
}

impl BudgetGuard {
    /// Create an empty guard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether `tokens` fits within the key's remaining daily budget
    /// and, if so, reserve it atomically. The day rolls over automatically
    /// when the UTC calendar day changes.
    pub fn check_and_reserve_daily(&self, key_id: &ApiKeyId, tokens: i64, daily_limit: i64) -> bool {
        let today = Timestamp::now().utc_day();
        let entry = self.daily.entry(key_id.clone()).or_insert_with(|| {
            Mutex::new(DailyCounter {
                day: today.clone(),
                spent: 0,
            })
        });
        let mut counter = entry.lock();

        if counter.day != today {
            counter.day = today;
            counter.spent = 0;
        }

        if counter.spent.saturating_add(tokens) > daily_limit {
            return false;
        }
        counter.spent = counter.spent.saturating_add(tokens);
        true
    }
}
