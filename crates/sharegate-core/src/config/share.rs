//! Share minting bounds.

use serde::{Deserialize, Serialize};

/// Bounds applied when an owner mints a share or capability link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Shortest allowed lifetime in hours.
    #[serde(default = "default_min_expiry")]
    pub min_expiry_hours: u32,
    /// Longest allowed lifetime in hours.
    #[serde(default = "default_max_expiry")]
    pub max_expiry_hours: u32,
    /// Largest allowed download cap.
    #[serde(default = "default_max_downloads")]
    pub max_downloads_limit: u32,
    /// How many fresh share codes to try before giving up on collisions.
    #[serde(default = "default_attempts")]
    pub code_generation_attempts: u32,
    /// Path prefix of public share URLs (`{public_base_url}{share_path}{code}`).
    #[serde(default = "default_share_path")]
    pub share_path: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            min_expiry_hours: default_min_expiry(),
            max_expiry_hours: default_max_expiry(),
            max_downloads_limit: default_max_downloads(),
            code_generation_attempts: default_attempts(),
            share_path: default_share_path(),
        }
    }
}

fn default_min_expiry() -> u32 {
    1
}

fn default_max_expiry() -> u32 {
    24 * 365
}

fn default_max_downloads() -> u32 {
    10_000
}

fn default_attempts() -> u32 {
    5
}

fn default_share_path() -> String {
    "/s/".to_string()
}
