//! Share registry: minting, listing, revocation and usage recording.

use std::sync::Arc;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use sharegate_auth::ShareCodeGenerator;
use sharegate_core::config::ShareConfig;
use sharegate_core::error::{AppError, ErrorKind};
use sharegate_core::events::ShareEvent;
use sharegate_core::result::AppResult;
use sharegate_core::traits::clock::Clock;
use sharegate_core::types::id::{FileId, ShareId};
use sharegate_core::types::pagination::{PageRequest, PageResponse};
use sharegate_database::ShareStore;
use sharegate_entity::share::{
    AccessLogEntry, AccessType, NewAccessLog, NewShare, Share, ShareCode, SharePermission,
};

use crate::activity::ActivityLogger;
use crate::context::RequestContext;

/// Request to mint a new share.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShareRequest {
    /// The file to share.
    pub file_id: FileId,
    /// Granted actions.
    pub permissions: SharePermission,
    /// Lifetime in hours.
    pub expires_in_hours: u32,
    /// Download cap (None = unlimited).
    pub max_downloads: Option<u32>,
}

/// Check a requested lifetime and download cap against the configured bounds.
///
/// Returns the cap converted to the stored representation.
pub(crate) fn validate_grant(
    config: &ShareConfig,
    expires_in_hours: u32,
    max_downloads: Option<u32>,
) -> AppResult<Option<i32>> {
    if expires_in_hours < config.min_expiry_hours || expires_in_hours > config.max_expiry_hours {
        return Err(AppError::validation(format!(
            "Expiry must be between {} and {} hours",
            config.min_expiry_hours, config.max_expiry_hours
        )));
    }

    max_downloads
        .map(|max| {
            if max == 0 || max > config.max_downloads_limit {
                return Err(AppError::validation(format!(
                    "Download limit must be between 1 and {}",
                    config.max_downloads_limit
                )));
            }
            i32::try_from(max).map_err(|_| AppError::validation("Download limit is too large"))
        })
        .transpose()
}

/// Durable record of shares and their access log.
#[derive(Debug, Clone)]
pub struct ShareRegistry {
    store: Arc<dyn ShareStore>,
    codes: ShareCodeGenerator,
    clock: Arc<dyn Clock>,
    activity: ActivityLogger,
    config: ShareConfig,
}

impl ShareRegistry {
    /// Creates a new share registry.
    pub fn new(
        store: Arc<dyn ShareStore>,
        codes: ShareCodeGenerator,
        clock: Arc<dyn Clock>,
        activity: ActivityLogger,
        config: ShareConfig,
    ) -> Self {
        Self {
            store,
            codes,
            clock,
            activity,
            config,
        }
    }

    /// Minting bounds in effect.
    pub fn config(&self) -> &ShareConfig {
        &self.config
    }

    /// Mint a share with a fresh code and zeroed counters.
    ///
    /// A code collision is retried with a new code up to the configured
    /// number of attempts, then reported as `Conflict`.
    pub async fn create_share(
        &self,
        ctx: &RequestContext,
        req: CreateShareRequest,
    ) -> AppResult<Share> {
        let max_downloads = validate_grant(&self.config, req.expires_in_hours, req.max_downloads)?;
        let now = self.clock.now();
        let expires_at = now + TimeDelta::hours(i64::from(req.expires_in_hours));

        let attempts = self.config.code_generation_attempts.max(1);
        for attempt in 1..=attempts {
            let data = NewShare {
                file_id: req.file_id,
                shared_by: ctx.user_id,
                share_code: self.codes.generate(),
                permissions: req.permissions,
                max_downloads,
                expires_at,
            };

            match self.store.insert(&data, now).await {
                Ok(share) => {
                    info!(
                        user_id = %ctx.user_id,
                        share_id = %share.id,
                        file_id = %share.file_id,
                        permissions = %share.permissions,
                        "Share created"
                    );
                    self.activity.emit(
                        Some(ctx.user_id),
                        ShareEvent::Created {
                            share_id: share.id,
                            file_id: share.file_id,
                            permissions: share.permissions.to_string(),
                            max_downloads: share.max_downloads,
                        },
                        now,
                    );
                    return Ok(share);
                }
                Err(e) if e.kind == ErrorKind::Conflict => {
                    warn!(attempt, "Share code collision, regenerating");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::conflict(format!(
            "Could not allocate a unique share code after {attempts} attempts"
        )))
    }

    /// Live shares of a file, newest first.
    pub async fn get_active_shares(&self, file_id: FileId) -> AppResult<Vec<Share>> {
        self.store
            .find_active_by_file(file_id, self.clock.now())
            .await
    }

    /// Look up a share by ID.
    pub async fn get(&self, share_id: ShareId) -> AppResult<Share> {
        self.store
            .find_by_id(share_id)
            .await?
            .ok_or_else(|| AppError::not_found("Share not found"))
    }

    /// Look up a share by its public code.
    pub async fn get_by_code(&self, code: &ShareCode) -> AppResult<Share> {
        self.store
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("Share not found"))
    }

    /// Deactivate every share of a file. Idempotent.
    pub async fn revoke_all(&self, file_id: FileId) -> AppResult<u64> {
        let now = self.clock.now();
        let live = self.store.find_active_by_file(file_id, now).await?;
        let touched = self.store.deactivate_by_file(file_id, now).await?;

        for share in &live {
            self.activity.emit(
                None,
                ShareEvent::Revoked {
                    share_id: share.id,
                    file_id,
                },
                now,
            );
        }

        info!(file_id = %file_id, touched, "Shares revoked for file");
        Ok(touched)
    }

    /// Deactivate one share owned by the caller. Idempotent.
    pub async fn revoke(&self, ctx: &RequestContext, share_id: ShareId) -> AppResult<()> {
        let share = self.get(share_id).await?;
        if share.shared_by != ctx.user_id {
            return Err(AppError::permission_denied(
                "You can only revoke your own shares",
            ));
        }

        let now = self.clock.now();
        self.store.deactivate(share_id, now).await?;

        if share.is_active {
            self.activity.emit(
                Some(ctx.user_id),
                ShareEvent::Revoked {
                    share_id,
                    file_id: share.file_id,
                },
                now,
            );
        }

        info!(user_id = %ctx.user_id, share_id = %share_id, "Share revoked");
        Ok(())
    }

    /// Re-check usability and atomically record one access.
    ///
    /// On rejection nothing is written.
    pub async fn record_access(
        &self,
        share_id: ShareId,
        action: AccessType,
        client: &NewAccessLog,
    ) -> AppResult<(Share, AccessLogEntry)> {
        self.store
            .record_access(share_id, action, client, self.clock.now())
            .await
    }

    /// Shares minted by the caller, newest first.
    pub async fn list_owned(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> AppResult<PageResponse<Share>> {
        self.store.find_by_owner(ctx.user_id, &page).await
    }

    /// Access log of a share owned by the caller, newest first.
    ///
    /// Shares owned by someone else are reported as not found.
    pub async fn access_log(
        &self,
        ctx: &RequestContext,
        share_id: ShareId,
    ) -> AppResult<Vec<AccessLogEntry>> {
        let share = self.get(share_id).await?;
        if share.shared_by != ctx.user_id {
            return Err(AppError::not_found("Share not found"));
        }
        self.store.access_log(share_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharegate_core::traits::activity::TracingActivitySink;
    use sharegate_core::traits::clock::ManualClock;
    use sharegate_core::traits::random::OsRandom;
    use sharegate_core::types::id::UserId;
    use sharegate_database::MemoryShareStore;

    fn registry() -> (ShareRegistry, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let registry = ShareRegistry::new(
            Arc::new(MemoryShareStore::new()),
            ShareCodeGenerator::new(Arc::new(OsRandom)),
            clock.clone(),
            ActivityLogger::new(Arc::new(TracingActivitySink)),
            ShareConfig::default(),
        );
        (registry, clock)
    }

    fn request(file_id: FileId) -> CreateShareRequest {
        CreateShareRequest {
            file_id,
            permissions: SharePermission::Both,
            expires_in_hours: 24,
            max_downloads: Some(2),
        }
    }

    #[test]
    fn test_validate_bounds() {
        let config = ShareConfig::default();
        assert_eq!(validate_grant(&config, 1, None).unwrap(), None);
        assert_eq!(validate_grant(&config, 8760, Some(10_000)).unwrap(), Some(10_000));

        for (hours, max) in [(0, None), (8761, None), (24, Some(0)), (24, Some(10_001))] {
            let err = validate_grant(&config, hours, max).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Validation);
        }
    }

    #[tokio::test]
    async fn test_create_share_sets_expiry_and_counters() {
        let (registry, clock) = registry();
        let ctx = RequestContext::new(UserId::new());
        let share = registry
            .create_share(&ctx, request(FileId::new()))
            .await
            .unwrap();

        assert_eq!(share.shared_by, ctx.user_id);
        assert_eq!(share.expires_at, clock.now() + TimeDelta::hours(24));
        assert_eq!(share.download_count, 0);
        assert_eq!(share.view_count, 0);
        assert!(share.is_active);
        assert!(ShareCode::is_well_formed(share.share_code.as_str()));
    }

    #[tokio::test]
    async fn test_active_shares_exclude_expired() {
        let (registry, clock) = registry();
        let ctx = RequestContext::new(UserId::new());
        let file_id = FileId::new();

        let mut short = request(file_id);
        short.expires_in_hours = 1;
        registry.create_share(&ctx, short).await.unwrap();
        registry.create_share(&ctx, request(file_id)).await.unwrap();
        assert_eq!(registry.get_active_shares(file_id).await.unwrap().len(), 2);

        clock.advance(TimeDelta::hours(2));
        assert_eq!(registry.get_active_shares(file_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_revoke_requires_owner() {
        let (registry, _) = registry();
        let owner = RequestContext::new(UserId::new());
        let share = registry
            .create_share(&owner, request(FileId::new()))
            .await
            .unwrap();

        let stranger = RequestContext::new(UserId::new());
        let err = registry.revoke(&stranger, share.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::PermissionDenied);

        registry.revoke(&owner, share.id).await.unwrap();
        registry.revoke(&owner, share.id).await.unwrap();
        assert!(!registry.get(share.id).await.unwrap().is_active);
    }

    #[tokio::test]
    async fn test_revoke_all_is_idempotent() {
        let (registry, _) = registry();
        let ctx = RequestContext::new(UserId::new());
        let file_id = FileId::new();
        registry.create_share(&ctx, request(file_id)).await.unwrap();
        registry.create_share(&ctx, request(file_id)).await.unwrap();

        assert_eq!(registry.revoke_all(file_id).await.unwrap(), 2);
        assert_eq!(registry.revoke_all(file_id).await.unwrap(), 2);
        assert!(registry.get_active_shares(file_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_access_log_hidden_from_non_owner() {
        let (registry, _) = registry();
        let owner = RequestContext::new(UserId::new());
        let share = registry
            .create_share(&owner, request(FileId::new()))
            .await
            .unwrap();
        registry
            .record_access(share.id, AccessType::View, &NewAccessLog::default())
            .await
            .unwrap();

        assert_eq!(registry.access_log(&owner, share.id).await.unwrap().len(), 1);
        let err = registry
            .access_log(&RequestContext::new(UserId::new()), share.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_list_owned_only_returns_callers_shares() {
        let (registry, _) = registry();
        let alice = RequestContext::new(UserId::new());
        let bob = RequestContext::new(UserId::new());
        registry.create_share(&alice, request(FileId::new())).await.unwrap();
        registry.create_share(&alice, request(FileId::new())).await.unwrap();
        registry.create_share(&bob, request(FileId::new())).await.unwrap();

        let page = registry
            .list_owned(&alice, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total_items, 2);
        assert!(page.items.iter().all(|s| s.shared_by == alice.user_id));
    }

    #[tokio::test]
    async fn test_list_owned_tolerates_hostile_page_requests() {
        let (registry, _) = registry();
        let ctx = RequestContext::new(UserId::new());
        registry.create_share(&ctx, request(FileId::new())).await.unwrap();

        let zero_size: PageRequest = serde_json::from_str(r#"{"page":1,"page_size":0}"#).unwrap();
        let page = registry.list_owned(&ctx, zero_size).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total_pages, 1);

        let far: PageRequest =
            serde_json::from_str(r#"{"page":18446744073709551615,"page_size":100}"#).unwrap();
        let page = registry.list_owned(&ctx, far).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 1);
        assert!(!page.has_next);
    }
}
