//! PostgreSQL share store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use sharegate_core::error::AppError;
use sharegate_core::result::AppResult;
use sharegate_core::types::id::{AccessLogId, FileId, ShareId, UserId};
use sharegate_core::types::pagination::{PageRequest, PageResponse};
use sharegate_entity::share::{
    AccessLogEntry, AccessType, NewAccessLog, NewShare, Share, ShareCode,
};

use super::map_sqlx;
use crate::store::ShareStore;

/// Conditional increment: the row is only updated when the share is still
/// usable for the requested action, so the check and the increment happen
/// under the same row lock.
const RECORD_ACCESS_SQL: &str = "UPDATE shares SET \
     download_count = download_count + CASE WHEN $2 THEN 1 ELSE 0 END, \
     view_count = view_count + CASE WHEN $2 THEN 0 ELSE 1 END, \
     updated_at = $3 \
     WHERE id = $1 \
       AND is_active \
       AND expires_at > $3 \
       AND (permissions = 'both' \
            OR permissions = CASE WHEN $2 THEN 'download'::share_permission \
                                  ELSE 'view'::share_permission END) \
       AND (NOT $2 OR max_downloads IS NULL OR download_count < max_downloads) \
     RETURNING *";

/// [`ShareStore`] backed by the `shares` and `share_access_logs` tables.
#[derive(Debug, Clone)]
pub struct PgShareStore {
    pool: PgPool,
}

impl PgShareStore {
    /// Create a new share store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShareStore for PgShareStore {
    async fn insert(&self, data: &NewShare, now: DateTime<Utc>) -> AppResult<Share> {
        sqlx::query_as::<_, Share>(
            "INSERT INTO shares (id, file_id, share_code, shared_by, permissions, max_downloads, \
             download_count, view_count, expires_at, is_active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, 0, 0, $7, TRUE, $8, $8) RETURNING *",
        )
        .bind(ShareId::new())
        .bind(data.file_id)
        .bind(&data.share_code)
        .bind(data.shared_by)
        .bind(data.permissions)
        .bind(data.max_downloads)
        .bind(data.expires_at)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx("Failed to create share", e))
    }

    async fn find_by_id(&self, id: ShareId) -> AppResult<Option<Share>> {
        sqlx::query_as::<_, Share>("SELECT * FROM shares WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx("Failed to find share", e))
    }

    async fn find_by_code(&self, code: &ShareCode) -> AppResult<Option<Share>> {
        sqlx::query_as::<_, Share>("SELECT * FROM shares WHERE share_code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx("Failed to find share by code", e))
    }

    async fn find_active_by_file(
        &self,
        file_id: FileId,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Share>> {
        sqlx::query_as::<_, Share>(
            "SELECT * FROM shares WHERE file_id = $1 AND is_active AND expires_at > $2 \
             ORDER BY created_at DESC",
        )
        .bind(file_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx("Failed to list active shares", e))
    }

    async fn find_by_owner(
        &self,
        owner: UserId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Share>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shares WHERE shared_by = $1")
            .bind(owner)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx("Failed to count shares", e))?;

        let shares = sqlx::query_as::<_, Share>(
            "SELECT * FROM shares WHERE shared_by = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(owner)
        .bind(i64::try_from(page.limit()).unwrap_or(i64::MAX))
        .bind(i64::try_from(page.offset()).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx("Failed to list shares", e))?;

        Ok(PageResponse::new(
            shares,
            page,
            u64::try_from(total).unwrap_or(0),
        ))
    }

    async fn deactivate_by_file(&self, file_id: FileId, now: DateTime<Utc>) -> AppResult<u64> {
        let result =
            sqlx::query("UPDATE shares SET is_active = FALSE, updated_at = $2 WHERE file_id = $1")
                .bind(file_id)
                .bind(now)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx("Failed to revoke shares", e))?;
        Ok(result.rows_affected())
    }

    async fn deactivate(&self, id: ShareId, now: DateTime<Utc>) -> AppResult<bool> {
        let result =
            sqlx::query("UPDATE shares SET is_active = FALSE, updated_at = $2 WHERE id = $1")
                .bind(id)
                .bind(now)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx("Failed to revoke share", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn record_access(
        &self,
        id: ShareId,
        action: AccessType,
        client: &NewAccessLog,
        now: DateTime<Utc>,
    ) -> AppResult<(Share, AccessLogEntry)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx("Failed to begin transaction", e))?;

        let updated = sqlx::query_as::<_, Share>(RECORD_ACCESS_SQL)
            .bind(id)
            .bind(action == AccessType::Download)
            .bind(now)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx("Failed to record access", e))?;

        let Some(share) = updated else {
            let current = sqlx::query_as::<_, Share>("SELECT * FROM shares WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| map_sqlx("Failed to find share", e))?;
            tx.rollback()
                .await
                .map_err(|e| map_sqlx("Failed to roll back", e))?;

            return Err(match current {
                None => AppError::not_found("Share not found"),
                Some(share) => share.check_access(action, now).err().unwrap_or_else(|| {
                    AppError::unavailable("Share changed during access, retry")
                }),
            });
        };

        let entry = sqlx::query_as::<_, AccessLogEntry>(
            "INSERT INTO share_access_logs (id, share_id, access_type, ip_address, user_agent, \
             referrer, accessed_at) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(AccessLogId::new())
        .bind(id)
        .bind(action)
        .bind(&client.ip_address)
        .bind(&client.user_agent)
        .bind(&client.referrer)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx("Failed to append access log", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx("Failed to commit access", e))?;

        debug!(
            share_id = %id,
            access_type = %action,
            download_count = share.download_count,
            "Share access recorded"
        );

        Ok((share, entry))
    }

    async fn access_log(&self, id: ShareId) -> AppResult<Vec<AccessLogEntry>> {
        sqlx::query_as::<_, AccessLogEntry>(
            "SELECT * FROM share_access_logs WHERE share_id = $1 ORDER BY accessed_at DESC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx("Failed to list access log", e))
    }
}
