//! Share store contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use sharegate_core::result::AppResult;
use sharegate_core::types::id::{FileId, ShareId, UserId};
use sharegate_core::types::pagination::{PageRequest, PageResponse};
use sharegate_entity::share::{AccessLogEntry, AccessType, NewAccessLog, NewShare, Share, ShareCode};

/// Durable storage for shares and their access log.
///
/// Implementations must enforce uniqueness of `share_code` (reporting a
/// collision as `ErrorKind::Conflict`) and must make [`record_access`]
/// a single atomic check-and-increment.
///
/// [`record_access`]: ShareStore::record_access
#[async_trait]
pub trait ShareStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persist a new share with zeroed counters.
    async fn insert(&self, data: &NewShare, now: DateTime<Utc>) -> AppResult<Share>;

    /// Find a share by ID.
    async fn find_by_id(&self, id: ShareId) -> AppResult<Option<Share>>;

    /// Find a share by its public code.
    async fn find_by_code(&self, code: &ShareCode) -> AppResult<Option<Share>>;

    /// Active, unexpired shares of a file, newest first.
    async fn find_active_by_file(&self, file_id: FileId, now: DateTime<Utc>)
    -> AppResult<Vec<Share>>;

    /// Shares minted by an owner, newest first.
    async fn find_by_owner(
        &self,
        owner: UserId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Share>>;

    /// Deactivate every share of a file. Returns the number of rows touched.
    async fn deactivate_by_file(&self, file_id: FileId, now: DateTime<Utc>) -> AppResult<u64>;

    /// Deactivate one share. Returns `false` if it does not exist.
    async fn deactivate(&self, id: ShareId, now: DateTime<Utc>) -> AppResult<bool>;

    /// Atomically re-check usability for `action`, bump the matching counter
    /// and append an access log entry.
    ///
    /// On rejection nothing is written and the error carries the reason
    /// (`NotFound`, `Expired`, `QuotaExceeded`, `PermissionDenied`).
    async fn record_access(
        &self,
        id: ShareId,
        action: AccessType,
        client: &NewAccessLog,
        now: DateTime<Utc>,
    ) -> AppResult<(Share, AccessLogEntry)>;

    /// Access log of a share, newest first.
    async fn access_log(&self, id: ShareId) -> AppResult<Vec<AccessLogEntry>>;
}
