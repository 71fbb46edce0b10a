//! Capability token claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sharegate_core::types::id::{FileId, ShareId};
use sharegate_entity::share::SharePermission;

/// Payload embedded in a capability token.
///
/// Field order is fixed by this declaration, which keeps the serialized
/// form deterministic for a given claim set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CapabilityClaims {
    /// The file the token grants access to.
    pub file_id: FileId,
    /// Display name of the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Granted actions.
    pub permissions: SharePermission,
    /// Advisory download cap; enforced only when bound to a share.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_downloads: Option<u32>,
    /// Share whose counters track usage of this token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_id: Option<ShareId>,
    /// Expiry as unix seconds.
    pub exp: i64,
    /// Random hex nonce; two tokens minted in the same instant never match.
    pub nonce: String,
}

impl CapabilityClaims {
    /// Whether the token is past its expiry at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() > self.exp
    }

    /// Expiry as a timestamp.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// What an owner asks to be granted; the signer adds the nonce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityGrant {
    /// The file to grant access to.
    pub file_id: FileId,
    /// Display name of the file.
    pub file_name: Option<String>,
    /// Granted actions.
    pub permissions: SharePermission,
    /// Advisory download cap.
    pub max_downloads: Option<u32>,
    /// Optional share binding for usage tracking.
    pub share_id: Option<ShareId>,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
}
