//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod auth;
pub mod database;
pub mod logging;
pub mod rate_limit;
pub mod share;

use serde::{Deserialize, Serialize};

pub use self::auth::AuthConfig;
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::rate_limit::{PolicyConfig, RateLimitConfig};
pub use self::share::ShareConfig;

use crate::error::AppError;

/// Prefix for environment variable overrides (`SHAREGATE__AUTH__...`).
const ENV_PREFIX: &str = "SHAREGATE";

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Capability signing and link settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Share minting bounds.
    #[serde(default)]
    pub share: ShareConfig,
    /// Rate limit policies.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `SHAREGATE__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Load configuration from a single file plus environment overrides.
    pub fn load_file(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.auth.share_signing_secret.len() < auth::MIN_SIGNING_SECRET_LEN {
            return Err(AppError::configuration(format!(
                "auth.share_signing_secret must be at least {} bytes",
                auth::MIN_SIGNING_SECRET_LEN
            )));
        }

        if self.share.min_expiry_hours == 0
            || self.share.min_expiry_hours > self.share.max_expiry_hours
        {
            return Err(AppError::configuration(
                "share.min_expiry_hours must be positive and not exceed max_expiry_hours",
            ));
        }

        if self.share.max_downloads_limit == 0 {
            return Err(AppError::configuration(
                "share.max_downloads_limit must be positive",
            ));
        }

        if self.share.code_generation_attempts == 0 {
            return Err(AppError::configuration(
                "share.code_generation_attempts must be positive",
            ));
        }

        if self.rate_limit.policies.is_empty() {
            return Err(AppError::configuration(
                "rate_limit.policies must define at least one policy",
            ));
        }

        for (name, policy) in &self.rate_limit.policies {
            if policy.window_ms == 0 || policy.max_requests == 0 {
                return Err(AppError::configuration(format!(
                    "rate_limit.policies.{name} needs a positive window_ms and max_requests"
                )));
            }
        }

        Ok(())
    }
}
