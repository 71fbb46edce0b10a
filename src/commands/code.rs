//! Share code generation.

use std::sync::Arc;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use sharegate_auth::ShareCodeGenerator;
use sharegate_core::error::AppError;
use sharegate_core::traits::random::OsRandom;

use crate::output::{self, OutputFormat};

/// Arguments for code generation
#[derive(Debug, Args)]
pub struct CodeArgs {
    /// Code subcommand
    #[command(subcommand)]
    pub command: CodeCommand,
}

/// Code subcommands
#[derive(Debug, clap::Subcommand)]
pub enum CodeCommand {
    /// Generate share codes
    Generate {
        /// How many codes to print
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct CodeRow {
    code: String,
}

/// Execute code commands
pub fn execute(args: &CodeArgs, format: OutputFormat) -> Result<(), AppError> {
    match &args.command {
        CodeCommand::Generate { count } => {
            let generator = ShareCodeGenerator::new(Arc::new(OsRandom));
            let rows: Vec<CodeRow> = (0..*count)
                .map(|_| CodeRow {
                    code: generator.generate().to_string(),
                })
                .collect();
            output::print_list(&rows, format);
        }
    }
    Ok(())
}
