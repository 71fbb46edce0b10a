//! In-memory share store guarded by a Tokio read-write lock.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use sharegate_core::error::AppError;
use sharegate_core::result::AppResult;
use sharegate_core::types::id::{FileId, ShareId, UserId};
use sharegate_core::types::pagination::{PageRequest, PageResponse};
use sharegate_entity::share::{
    AccessLogEntry, AccessType, NewAccessLog, NewShare, Share, ShareCode,
};

use crate::store::ShareStore;

#[derive(Debug, Default)]
struct InnerState {
    shares: HashMap<ShareId, Share>,
    /// Unique index on share codes.
    codes: HashMap<ShareCode, ShareId>,
    /// Append-only access log.
    access_log: Vec<AccessLogEntry>,
}

/// In-memory [`ShareStore`].
///
/// Every mutation holds the write lock for its whole check-and-write
/// sequence, which makes `record_access` atomic. Suitable for single-node
/// deployments only.
#[derive(Debug, Clone, Default)]
pub struct MemoryShareStore {
    state: Arc<RwLock<InnerState>>,
}

impl MemoryShareStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(shares: &mut [Share]) {
    shares.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[async_trait]
impl ShareStore for MemoryShareStore {
    async fn insert(&self, data: &NewShare, now: DateTime<Utc>) -> AppResult<Share> {
        let mut state = self.state.write().await;

        if state.codes.contains_key(&data.share_code) {
            return Err(AppError::conflict(format!(
                "Share code {} already exists",
                data.share_code
            )));
        }

        let share = Share::from_new(ShareId::new(), data, now);
        state.codes.insert(share.share_code.clone(), share.id);
        state.shares.insert(share.id, share.clone());

        Ok(share)
    }

    async fn find_by_id(&self, id: ShareId) -> AppResult<Option<Share>> {
        let state = self.state.read().await;
        Ok(state.shares.get(&id).cloned())
    }

    async fn find_by_code(&self, code: &ShareCode) -> AppResult<Option<Share>> {
        let state = self.state.read().await;
        Ok(state
            .codes
            .get(code)
            .and_then(|id| state.shares.get(id))
            .cloned())
    }

    async fn find_active_by_file(
        &self,
        file_id: FileId,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Share>> {
        let state = self.state.read().await;
        let mut shares: Vec<Share> = state
            .shares
            .values()
            .filter(|s| s.file_id == file_id && s.is_live(now))
            .cloned()
            .collect();
        newest_first(&mut shares);
        Ok(shares)
    }

    async fn find_by_owner(
        &self,
        owner: UserId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Share>> {
        let state = self.state.read().await;
        let mut shares: Vec<Share> = state
            .shares
            .values()
            .filter(|s| s.shared_by == owner)
            .cloned()
            .collect();
        newest_first(&mut shares);

        let total = shares.len() as u64;
        let items = shares
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(page.limit()).unwrap_or(usize::MAX))
            .collect();

        Ok(PageResponse::new(items, page, total))
    }

    async fn deactivate_by_file(&self, file_id: FileId, now: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let mut touched = 0u64;

        for share in state.shares.values_mut().filter(|s| s.file_id == file_id) {
            share.is_active = false;
            share.updated_at = now;
            touched += 1;
        }

        Ok(touched)
    }

    async fn deactivate(&self, id: ShareId, now: DateTime<Utc>) -> AppResult<bool> {
        let mut state = self.state.write().await;
        match state.shares.get_mut(&id) {
            Some(share) => {
                share.is_active = false;
                share.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn record_access(
        &self,
        id: ShareId,
        action: AccessType,
        client: &NewAccessLog,
        now: DateTime<Utc>,
    ) -> AppResult<(Share, AccessLogEntry)> {
        let mut state = self.state.write().await;

        let share = state
            .shares
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("Share not found"))?;

        share.check_access(action, now)?;
        share.apply_access(action, now);
        let share = share.clone();

        let entry = AccessLogEntry::record(id, action, client, now);
        state.access_log.push(entry.clone());

        debug!(
            share_id = %id,
            access_type = %action,
            download_count = share.download_count,
            view_count = share.view_count,
            "Share access recorded"
        );

        Ok((share, entry))
    }

    async fn access_log(&self, id: ShareId) -> AppResult<Vec<AccessLogEntry>> {
        let state = self.state.read().await;
        let mut entries: Vec<AccessLogEntry> = state
            .access_log
            .iter()
            .filter(|e| e.share_id == id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.accessed_at.cmp(&a.accessed_at));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use sharegate_core::error::ErrorKind;
    use sharegate_entity::share::SharePermission;

    fn new_share(code: [u8; 8], file_id: FileId, max_downloads: Option<i32>) -> NewShare {
        NewShare {
            file_id,
            shared_by: UserId::new(),
            share_code: ShareCode::from_bytes(code),
            permissions: SharePermission::Both,
            max_downloads,
            expires_at: Utc::now() + TimeDelta::hours(1),
        }
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_code() {
        let store = MemoryShareStore::new();
        let file_id = FileId::new();
        store
            .insert(&new_share([7; 8], file_id, None), Utc::now())
            .await
            .unwrap();
        let err = store
            .insert(&new_share([7; 8], file_id, None), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_find_by_code() {
        let store = MemoryShareStore::new();
        let share = store
            .insert(&new_share([1; 8], FileId::new(), None), Utc::now())
            .await
            .unwrap();
        let found = store.find_by_code(&share.share_code).await.unwrap();
        assert_eq!(found, Some(share));
        let missing = store
            .find_by_code(&ShareCode::from_bytes([2; 8]))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_record_access_rejection_writes_nothing() {
        let store = MemoryShareStore::new();
        let now = Utc::now();
        let share = store
            .insert(&new_share([3; 8], FileId::new(), Some(1)), now)
            .await
            .unwrap();

        store
            .record_access(share.id, AccessType::Download, &NewAccessLog::default(), now)
            .await
            .unwrap();
        let err = store
            .record_access(share.id, AccessType::Download, &NewAccessLog::default(), now)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::QuotaExceeded);

        let stored = store.find_by_id(share.id).await.unwrap().unwrap();
        assert_eq!(stored.download_count, 1);
        assert_eq!(store.access_log(share.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_record_access_unknown_share() {
        let store = MemoryShareStore::new();
        let err = store
            .record_access(
                ShareId::new(),
                AccessType::View,
                &NewAccessLog::default(),
                Utc::now(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_downloads_never_overshoot() {
        let store = MemoryShareStore::new();
        let now = Utc::now();
        let share = store
            .insert(&new_share([4; 8], FileId::new(), Some(5)), now)
            .await
            .unwrap();

        let attempts = (0..20).map(|_| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .record_access(share.id, AccessType::Download, &NewAccessLog::default(), now)
                    .await
            })
        });
        let results = futures::future::join_all(attempts).await;

        let ok = results
            .iter()
            .filter(|r| matches!(r, Ok(Ok(_))))
            .count();
        assert_eq!(ok, 5);

        let stored = store.find_by_id(share.id).await.unwrap().unwrap();
        assert_eq!(stored.download_count, 5);
    }

    #[tokio::test]
    async fn test_deactivate_by_file_only_touches_that_file() {
        let store = MemoryShareStore::new();
        let now = Utc::now();
        let file_id = FileId::new();
        let a = store.insert(&new_share([5; 8], file_id, None), now).await.unwrap();
        let b = store.insert(&new_share([6; 8], file_id, None), now).await.unwrap();
        let other = store
            .insert(&new_share([8; 8], FileId::new(), None), now)
            .await
            .unwrap();

        let later = now + TimeDelta::seconds(5);
        assert_eq!(store.deactivate_by_file(file_id, later).await.unwrap(), 2);

        for id in [a.id, b.id] {
            let share = store.find_by_id(id).await.unwrap().unwrap();
            assert!(!share.is_active);
            assert_eq!(share.updated_at, later);
        }
        assert!(store.find_by_id(other.id).await.unwrap().unwrap().is_active);
        assert!(store.find_active_by_file(file_id, later).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_by_owner_paginates() {
        let store = MemoryShareStore::new();
        let owner = UserId::new();
        let start = Utc::now();
        for i in 0..5u8 {
            let mut data = new_share([i + 10; 8], FileId::new(), None);
            data.shared_by = owner;
            store
                .insert(&data, start + TimeDelta::seconds(i64::from(i)))
                .await
                .unwrap();
        }

        let page = store
            .find_by_owner(owner, &PageRequest::new(1, 2))
            .await
            .unwrap();
        assert_eq!(page.total_items, 5);
        assert_eq!(page.items.len(), 2);
        assert!(page.items[0].created_at > page.items[1].created_at);
        assert!(page.has_next);
    }
}
