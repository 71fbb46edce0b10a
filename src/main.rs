//! Sharegate operator CLI entry point.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use sharegate_core::config::{AppConfig, LoggingConfig};

mod commands;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = AppConfig::load_file(&cli.config);

    let logging = config
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();
    init_logging(&logging);
    tracing::debug!(config_path = %cli.config, "Running command");

    if let Err(e) = cli.execute(config).await {
        tracing::debug!(kind = %e.kind, "Command failed");
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}

/// Initialize tracing/logging. `RUST_LOG` overrides the configured level.
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
