//! Rate limit counter storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::result::AppResult;
use crate::types::rate_limit::{RateLimitDecision, RateLimitPolicy};

/// Storage for fixed-window counters.
///
/// `hit` must be atomic per key: concurrent hits on the same key are never
/// lost, and a denied hit neither increments nor extends the window. The
/// in-memory implementation lives in `sharegate-cache`; a shared external
/// store can implement the same contract for multi-process deployments.
#[async_trait]
pub trait RateLimitStore: Send + Sync + std::fmt::Debug + 'static {
    /// Count one request for `key` under `policy` at `now`.
    async fn hit(
        &self,
        key: &str,
        policy: &RateLimitPolicy,
        now: DateTime<Utc>,
    ) -> AppResult<RateLimitDecision>;

    /// Remove every counter whose window ended at or before `now`.
    /// Returns the number of removed entries.
    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;

    /// Drop the counter for `key`.
    async fn reset(&self, key: &str) -> AppResult<()>;

    /// Number of live counters.
    async fn len(&self) -> AppResult<usize>;
}
