//! CLI command definitions and dispatch.

pub mod code;
pub mod config;
pub mod link;
pub mod migrate;
pub mod secret;
pub mod share;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use sharegate_auth::{CapabilitySigner, ShareCodeGenerator};
use sharegate_core::config::AppConfig;
use sharegate_core::error::AppError;
use sharegate_core::result::AppResult;
use sharegate_core::traits::activity::TracingActivitySink;
use sharegate_core::traits::clock::SystemClock;
use sharegate_core::traits::random::OsRandom;
use sharegate_database::{DatabasePool, PgShareStore, ShareStore};
use sharegate_service::{ActivityLogger, LinkService, ShareRegistry};

use crate::output::OutputFormat;

/// Sharegate: capability-scoped file sharing and abuse control
#[derive(Debug, Parser)]
#[command(name = "sharegate", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Capability link minting and inspection
    Link(link::LinkArgs),
    /// Share code generation
    Code(code::CodeArgs),
    /// Signing secret generation
    Secret(secret::SecretArgs),
    /// Share administration against the database
    Share(share::ShareArgs),
    /// Database migration management
    Migrate,
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppResult<AppConfig>) -> Result<(), AppError> {
        match &self.command {
            Commands::Link(args) => link::execute(args, &config?, self.format).await,
            Commands::Code(args) => code::execute(args, self.format),
            Commands::Secret(args) => secret::execute(args),
            Commands::Share(args) => share::execute(args, &config?, self.format).await,
            Commands::Migrate => migrate::execute(&config?).await,
            Commands::Config(args) => config::execute(args, config, &self.config, self.format),
        }
    }
}

/// Helper: connect the PostgreSQL share store
pub async fn connect_store(config: &AppConfig) -> Result<Arc<PgShareStore>, AppError> {
    let pool = DatabasePool::connect(&config.database).await?;
    Ok(Arc::new(PgShareStore::new(pool.into_pool())))
}

/// Helper: a share registry and link service over `store`
pub fn sharing(
    config: &AppConfig,
    store: Arc<dyn ShareStore>,
) -> AppResult<(Arc<ShareRegistry>, LinkService)> {
    let random = Arc::new(OsRandom);
    let clock = Arc::new(SystemClock);
    let registry = Arc::new(ShareRegistry::new(
        store,
        ShareCodeGenerator::new(random.clone()),
        clock.clone(),
        ActivityLogger::new(Arc::new(TracingActivitySink)),
        config.share.clone(),
    ));
    let links = LinkService::new(
        Arc::clone(&registry),
        CapabilitySigner::from_config(&config.auth, random)?,
        clock,
        &config.auth.public_base_url,
    )?;
    Ok((registry, links))
}
