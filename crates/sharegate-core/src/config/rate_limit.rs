//! Rate limit policy configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Name of the default upload policy.
pub const UPLOAD_POLICY: &str = "upload";
/// Name of the stricter per-minute upload policy.
pub const UPLOAD_BURST_POLICY: &str = "upload_burst";

/// Rate limiter configuration.
///
/// The policy set is read once at startup; it is not reloaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Interval between compaction sweeps in seconds.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
    /// Named fixed-window policies.
    #[serde(default = "default_policies")]
    pub policies: BTreeMap<String, PolicyConfig>,
}

/// A single fixed-window policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Window length in milliseconds.
    pub window_ms: u64,
    /// Maximum requests allowed per window.
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            sweep_interval_seconds: default_sweep_interval(),
            policies: default_policies(),
        }
    }
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_policies() -> BTreeMap<String, PolicyConfig> {
    let mut policies = BTreeMap::new();
    policies.insert(
        UPLOAD_POLICY.to_string(),
        PolicyConfig {
            window_ms: 15 * 60 * 1000,
            max_requests: 100,
        },
    );
    policies.insert(
        UPLOAD_BURST_POLICY.to_string(),
        PolicyConfig {
            window_ms: 60 * 1000,
            max_requests: 10,
        },
    );
    policies
}
