//! Share entity model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use sharegate_core::error::AppError;
use sharegate_core::types::id::{FileId, ShareId, UserId};

use super::access_log::AccessType;
use super::code::ShareCode;

/// Actions a share grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "share_permission", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SharePermission {
    /// Metadata and preview only.
    View,
    /// Content download only.
    Download,
    /// Both view and download.
    Both,
}

impl SharePermission {
    /// Whether this permission covers `action`.
    pub fn allows(&self, action: AccessType) -> bool {
        matches!(
            (self, action),
            (Self::Both, _)
                | (Self::View, AccessType::View)
                | (Self::Download, AccessType::Download)
        )
    }

    /// The lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Download => "download",
            Self::Both => "both",
        }
    }
}

impl fmt::Display for SharePermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SharePermission {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(Self::View),
            "download" => Ok(Self::Download),
            "both" => Ok(Self::Both),
            other => Err(AppError::validation(format!(
                "Unknown permission '{other}'. Expected view, download or both"
            ))),
        }
    }
}

/// A durable grant of access to one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Share {
    /// Unique share identifier.
    pub id: ShareId,
    /// The shared file.
    pub file_id: FileId,
    /// Public share code.
    pub share_code: ShareCode,
    /// Owner who minted the share.
    pub shared_by: UserId,
    /// Granted actions.
    pub permissions: SharePermission,
    /// Download cap (None = unlimited).
    pub max_downloads: Option<i32>,
    /// Downloads recorded so far.
    pub download_count: i32,
    /// Views recorded so far.
    pub view_count: i32,
    /// When the share stops being usable.
    pub expires_at: DateTime<Utc>,
    /// False once revoked. Never flips back.
    pub is_active: bool,
    /// When the share was created.
    pub created_at: DateTime<Utc>,
    /// Last counter change or revocation.
    pub updated_at: DateTime<Utc>,
}

impl Share {
    /// Materialize a new share with zeroed counters.
    pub fn from_new(id: ShareId, data: &NewShare, now: DateTime<Utc>) -> Self {
        Self {
            id,
            file_id: data.file_id,
            share_code: data.share_code.clone(),
            shared_by: data.shared_by,
            permissions: data.permissions,
            max_downloads: data.max_downloads,
            download_count: 0,
            view_count: 0,
            expires_at: data.expires_at,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the share has passed its expiry at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Whether the download cap has been reached.
    pub fn is_exhausted(&self) -> bool {
        self.max_downloads
            .is_some_and(|max| self.download_count >= max)
    }

    /// Downloads left before the cap (None = unlimited).
    pub fn remaining_downloads(&self) -> Option<i32> {
        self.max_downloads
            .map(|max| (max - self.download_count).max(0))
    }

    /// Active and not yet expired; shown in owner listings.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired(now)
    }

    /// Check whether `action` may be served at `now`.
    ///
    /// Checks run in a fixed order: revocation or expiry, then the download
    /// cap (downloads only), then permissions.
    pub fn check_access(&self, action: AccessType, now: DateTime<Utc>) -> Result<(), AppError> {
        if !self.is_active {
            return Err(AppError::expired("Share link has been revoked"));
        }

        if self.is_expired(now) {
            return Err(AppError::expired("Share link has expired"));
        }

        if action == AccessType::Download && self.is_exhausted() {
            return Err(AppError::quota_exceeded(
                "Share link has reached its download limit",
            ));
        }

        if !self.permissions.allows(action) {
            return Err(AppError::permission_denied(format!(
                "Share link does not permit {action}"
            )));
        }

        Ok(())
    }

    /// Bump the counter for `action`.
    pub fn apply_access(&mut self, action: AccessType, now: DateTime<Utc>) {
        match action {
            AccessType::View => self.view_count += 1,
            AccessType::Download => self.download_count += 1,
        }
        self.updated_at = now;
    }
}

/// Data required to persist a new share.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewShare {
    /// The shared file.
    pub file_id: FileId,
    /// Owner minting the share.
    pub shared_by: UserId,
    /// Freshly generated share code.
    pub share_code: ShareCode,
    /// Granted actions.
    pub permissions: SharePermission,
    /// Download cap (None = unlimited).
    pub max_downloads: Option<i32>,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
}
