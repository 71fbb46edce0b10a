//! Signing and link configuration.

use serde::{Deserialize, Serialize};

/// Minimum accepted length of the capability signing secret, in bytes.
pub const MIN_SIGNING_SECRET_LEN: usize = 32;

/// Capability-token signing and public link configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for capability token signing (HMAC-SHA256).
    #[serde(default, skip_serializing)]
    pub share_signing_secret: String,
    /// Base URL used when building public share and capability links.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            share_signing_secret: String::new(),
            public_base_url: default_public_base_url(),
        }
    }
}

fn default_public_base_url() -> String {
    "http://localhost:3000".to_string()
}
