//! Rate-limit domain events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Events emitted by the rate limiter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RateLimitEvent {
    /// A client exceeded a policy.
    Exceeded {
        /// The policy that denied the request.
        policy: String,
        /// The client identity the counter is keyed by.
        identity: String,
        /// When the window resets.
        reset_at: DateTime<Utc>,
    },
}

impl RateLimitEvent {
    /// Short event name for log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Exceeded { .. } => "rate_limit.exceeded",
        }
    }
}
