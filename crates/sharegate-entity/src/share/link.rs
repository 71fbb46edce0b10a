//! Share link value object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::code::ShareCode;

/// What the owner receives after minting a share.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLink {
    /// The share code.
    pub share_code: ShareCode,
    /// The full public URL for accessing the share.
    pub public_url: String,
    /// When the link expires.
    pub expires_at: DateTime<Utc>,
}
