//! Signing secret generation.

use clap::{Args, Subcommand};

use sharegate_core::config::auth::MIN_SIGNING_SECRET_LEN;
use sharegate_core::error::AppError;
use sharegate_core::traits::random::{OsRandom, RandomSource};

/// Arguments for secret commands
#[derive(Debug, Args)]
pub struct SecretArgs {
    /// Secret subcommand
    #[command(subcommand)]
    pub command: SecretCommand,
}

/// Secret subcommands
#[derive(Debug, Subcommand)]
pub enum SecretCommand {
    /// Print a fresh hex signing secret
    Generate {
        /// Number of random bytes (hex output is twice as long)
        #[arg(short, long, default_value_t = 32)]
        bytes: usize,
    },
}

/// Execute secret commands
pub fn execute(args: &SecretArgs) -> Result<(), AppError> {
    match &args.command {
        SecretCommand::Generate { bytes } => {
            println!("{}", generate(*bytes)?);
        }
    }
    Ok(())
}

/// Largest secret the command will produce, in random bytes.
const MAX_SECRET_BYTES: usize = 1024;

fn generate(bytes: usize) -> Result<String, AppError> {
    // Hex doubles the length, and the config check counts characters.
    if bytes.saturating_mul(2) < MIN_SIGNING_SECRET_LEN {
        return Err(AppError::validation(format!(
            "Secrets need at least {} random bytes",
            MIN_SIGNING_SECRET_LEN / 2
        )));
    }
    if bytes > MAX_SECRET_BYTES {
        return Err(AppError::validation(format!(
            "Secrets are capped at {MAX_SECRET_BYTES} random bytes"
        )));
    }

    let mut secret = vec![0u8; bytes];
    OsRandom.fill_bytes(&mut secret);
    Ok(hex::encode(secret))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_secret_passes_validation_length() {
        let secret = generate(16).unwrap();
        assert_eq!(secret.len(), MIN_SIGNING_SECRET_LEN);
        assert!(secret.bytes().all(|b| b.is_ascii_hexdigit()));
        assert_ne!(generate(32).unwrap(), generate(32).unwrap());
    }

    #[test]
    fn test_short_secret_refused() {
        assert!(generate(8).is_err());
    }

    #[test]
    fn test_oversized_secret_refused_without_overflow() {
        for bytes in [MAX_SECRET_BYTES + 1, usize::MAX / 2 + 1, usize::MAX] {
            let err = generate(bytes).unwrap_err();
            assert_eq!(err.kind, sharegate_core::error::ErrorKind::Validation);
        }
        assert_eq!(generate(MAX_SECRET_BYTES).unwrap().len(), MAX_SECRET_BYTES * 2);
    }
}
