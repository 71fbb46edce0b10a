//! Fixed-window rate limit policy and decision types.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::config::PolicyConfig;

/// A named fixed-window policy: at most `max_requests` per `window_ms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitPolicy {
    /// Policy name, also used as the key namespace.
    pub name: String,
    /// Window length in milliseconds.
    pub window_ms: u64,
    /// Maximum requests allowed per window.
    pub max_requests: u32,
}

impl RateLimitPolicy {
    /// Create a new policy.
    pub fn new(name: impl Into<String>, window_ms: u64, max_requests: u32) -> Self {
        Self {
            name: name.into(),
            window_ms,
            max_requests,
        }
    }

    /// Build a policy from its configuration entry.
    pub fn from_config(name: &str, config: &PolicyConfig) -> Self {
        Self::new(name, config.window_ms, config.max_requests)
    }

    /// The window length as a signed duration.
    pub fn window(&self) -> TimeDelta {
        TimeDelta::milliseconds(i64::try_from(self.window_ms).unwrap_or(i64::MAX))
    }
}

/// Outcome of a single rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitDecision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Requests left in the current window.
    pub remaining: u32,
    /// When the current window ends.
    pub reset_at: DateTime<Utc>,
    /// The policy limit.
    pub total: u32,
}

impl RateLimitDecision {
    /// Unix seconds of the window reset, as sent in `X-RateLimit-Reset`.
    pub fn reset_unix(&self) -> i64 {
        self.reset_at.timestamp()
    }

    /// Whole seconds until the window resets, rounded up, never negative.
    pub fn retry_after_seconds(&self, now: DateTime<Utc>) -> u64 {
        let millis = (self.reset_at - now).num_milliseconds().max(0);
        u64::try_from(millis).unwrap_or(0).div_ceil(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_conversion() {
        let policy = RateLimitPolicy::new("upload", 1500, 3);
        assert_eq!(policy.window(), TimeDelta::milliseconds(1500));
    }

    #[test]
    fn test_retry_after_rounds_up() {
        let now = Utc::now();
        let decision = RateLimitDecision {
            allowed: false,
            remaining: 0,
            reset_at: now + TimeDelta::milliseconds(1200),
            total: 3,
        };
        assert_eq!(decision.retry_after_seconds(now), 2);
        assert_eq!(decision.retry_after_seconds(now + TimeDelta::seconds(5)), 0);
    }
}
