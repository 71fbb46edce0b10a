//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use sharegate_core::config::AppConfig;
use sharegate_core::error::AppError;
use sharegate_core::result::AppResult;
use sharegate_database::mask_password;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration (the signing secret is never printed)
    Show,
    /// Validate configuration file
    Validate,
}

/// Execute config commands
pub fn execute(
    args: &ConfigArgs,
    config: AppResult<AppConfig>,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            output::print_item(&config?, format);
        }
        ConfigCommand::Validate => match config.and_then(|c| c.validate().map(|()| c)) {
            Ok(config) => {
                output::print_success(&format!("Configuration '{config_path}' is valid"));
                println!("  Public URL: {}", config.auth.public_base_url);
                println!("  Database: {}", mask_password(&config.database.url));
                println!(
                    "  Policies: {}",
                    config
                        .rate_limit
                        .policies
                        .keys()
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {e}"));
                return Err(e);
            }
        },
    }

    Ok(())
}
