//! Share access log entries.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use sharegate_core::error::AppError;
use sharegate_core::types::id::{AccessLogId, ShareId};

/// The action a visitor requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "share_access_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AccessType {
    /// Metadata or preview.
    View,
    /// Full content download.
    Download,
}

impl AccessType {
    /// The lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Download => "download",
        }
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(Self::View),
            "download" => Ok(Self::Download),
            other => Err(AppError::malformed(format!(
                "Unknown action '{other}'. Expected view or download"
            ))),
        }
    }
}

/// Append-only record of one successful access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AccessLogEntry {
    /// Entry ID.
    pub id: AccessLogId,
    /// The share that was used.
    pub share_id: ShareId,
    /// What was served.
    pub access_type: AccessType,
    /// Client address.
    pub ip_address: Option<String>,
    /// Client user agent.
    pub user_agent: Option<String>,
    /// Referring page.
    pub referrer: Option<String>,
    /// When the access was recorded.
    pub accessed_at: DateTime<Utc>,
}

/// Client details captured with an access.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccessLog {
    /// Client address.
    pub ip_address: Option<String>,
    /// Client user agent.
    pub user_agent: Option<String>,
    /// Referring page.
    pub referrer: Option<String>,
}

impl AccessLogEntry {
    /// Build an entry for `share_id` from captured client details.
    pub fn record(
        share_id: ShareId,
        access_type: AccessType,
        client: &NewAccessLog,
        accessed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AccessLogId::new(),
            share_id,
            access_type,
            ip_address: client.ip_address.clone(),
            user_agent: client.user_agent.clone(),
            referrer: client.referrer.clone(),
            accessed_at,
        }
    }
}
