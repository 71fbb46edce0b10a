//! Share-related domain events.

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;
use crate::types::id::{FileId, ShareId};

/// Events related to sharing operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShareEvent {
    /// A share was created.
    Created {
        /// The share ID.
        share_id: ShareId,
        /// The shared file.
        file_id: FileId,
        /// Granted permissions (`view`, `download`, `both`).
        permissions: String,
        /// Download cap, if any.
        max_downloads: Option<i32>,
    },
    /// A share or capability link was used successfully.
    Accessed {
        /// The share ID, absent for unbound capability links.
        share_id: Option<ShareId>,
        /// The accessed file.
        file_id: FileId,
        /// `view` or `download`.
        access_type: String,
        /// The accessor's IP address (if available).
        ip_address: Option<String>,
    },
    /// An access attempt was rejected.
    AccessDenied {
        /// The share ID, when the credential resolved to one.
        share_id: Option<ShareId>,
        /// `view` or `download`.
        access_type: String,
        /// Why the attempt was rejected.
        reason: ErrorKind,
        /// The accessor's IP address (if available).
        ip_address: Option<String>,
    },
    /// A share was revoked.
    Revoked {
        /// The share ID.
        share_id: ShareId,
        /// The shared file.
        file_id: FileId,
    },
}

impl ShareEvent {
    /// Short event name for log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Created { .. } => "share.created",
            Self::Accessed { .. } => "share.accessed",
            Self::AccessDenied { .. } => "share.access_denied",
            Self::Revoked { .. } => "share.revoked",
        }
    }
}
