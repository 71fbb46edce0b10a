//! In-memory fixed-window counters backed by DashMap.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use sharegate_core::result::AppResult;
use sharegate_core::traits::rate_limit::RateLimitStore;
use sharegate_core::types::rate_limit::{RateLimitDecision, RateLimitPolicy};

/// One client's counter inside the current window.
#[derive(Debug, Clone, Copy)]
struct WindowCounter {
    count: u32,
    reset_at: DateTime<Utc>,
}

/// In-memory [`RateLimitStore`].
///
/// Each hit runs under the shard lock of its key via the entry API, and
/// compaction uses `retain`, which takes the same shard locks. An entry is
/// therefore never removed in the middle of an increment.
#[derive(Debug, Clone, Default)]
pub struct MemoryRateLimitStore {
    counters: Arc<DashMap<String, WindowCounter>>,
}

impl MemoryRateLimitStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimitStore for MemoryRateLimitStore {
    async fn hit(
        &self,
        key: &str,
        policy: &RateLimitPolicy,
        now: DateTime<Utc>,
    ) -> AppResult<RateLimitDecision> {
        let reset_at = now + policy.window();
        let mut entry = self
            .counters
            .entry(key.to_string())
            .or_insert(WindowCounter { count: 0, reset_at });
        let counter = entry.value_mut();

        if counter.reset_at <= now {
            counter.count = 0;
            counter.reset_at = reset_at;
        }

        let allowed = counter.count < policy.max_requests;
        if allowed {
            counter.count += 1;
        }

        Ok(RateLimitDecision {
            allowed,
            remaining: policy.max_requests.saturating_sub(counter.count),
            reset_at: counter.reset_at,
            total: policy.max_requests,
        })
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let before = self.counters.len();
        self.counters.retain(|_, counter| counter.reset_at > now);
        let purged = before.saturating_sub(self.counters.len()) as u64;
        if purged > 0 {
            debug!(purged, "Purged expired rate limit windows");
        }
        Ok(purged)
    }

    async fn reset(&self, key: &str) -> AppResult<()> {
        self.counters.remove(key);
        Ok(())
    }

    async fn len(&self) -> AppResult<usize> {
        Ok(self.counters.len())
    }
}
