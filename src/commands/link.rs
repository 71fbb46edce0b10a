//! Capability link minting and inspection.
//!
//! Unbound minting is offline: it needs the signing secret but no database,
//! so the registry behind it is an empty in-memory one. Binding a link to a
//! share checks that share in PostgreSQL.

use std::sync::Arc;

use chrono::Utc;
use clap::{Args, Subcommand};
use serde::Serialize;

use sharegate_auth::{CapabilityVerifier, Verification};
use sharegate_core::config::AppConfig;
use sharegate_core::error::AppError;
use sharegate_core::types::id::{FileId, ShareId, UserId};
use sharegate_database::MemoryShareStore;
use sharegate_entity::share::SharePermission;
use sharegate_database::ShareStore;
use sharegate_service::{CapabilityLinkRequest, Credential, RequestContext};

use crate::output::{self, OutputFormat};

/// Arguments for link commands
#[derive(Debug, Args)]
pub struct LinkArgs {
    /// Link subcommand
    #[command(subcommand)]
    pub command: LinkCommand,
}

/// Link subcommands
#[derive(Debug, Subcommand)]
pub enum LinkCommand {
    /// Mint a signed capability link
    Mint {
        /// File the link grants access to
        #[arg(long)]
        file_id: FileId,
        /// Display name embedded in the token
        #[arg(long)]
        file_name: Option<String>,
        /// view, download or both
        #[arg(short, long, default_value = "view")]
        permissions: SharePermission,
        /// Lifetime in hours
        #[arg(short, long, default_value_t = 24)]
        expires_in_hours: u32,
        /// Download cap
        #[arg(short, long)]
        max_downloads: Option<u32>,
        /// Share whose counters track the link
        #[arg(long, requires = "owner")]
        share_id: Option<ShareId>,
        /// Owner of the bound share
        #[arg(long)]
        owner: Option<UserId>,
        /// URL the token is attached to (defaults to the public base URL)
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Verify a capability link or query string and print its claims
    Inspect {
        /// Full URL or bare query string
        link: String,
    },
}

/// Claims of an inspected link
#[derive(Debug, Serialize)]
struct InspectReport {
    valid: bool,
    file_id: Option<String>,
    file_name: Option<String>,
    permissions: Option<String>,
    max_downloads: Option<u32>,
    share_id: Option<String>,
    expires_at: Option<String>,
    is_expired: Option<bool>,
}

/// Execute link commands
pub async fn execute(
    args: &LinkArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    config.validate()?;

    match &args.command {
        LinkCommand::Mint {
            file_id,
            file_name,
            permissions,
            expires_in_hours,
            max_downloads,
            share_id,
            owner,
            base_url,
        } => {
            let store: Arc<dyn ShareStore> = match share_id {
                Some(_) => super::connect_store(config).await?,
                None => Arc::new(MemoryShareStore::new()),
            };
            let (_, links) = super::sharing(config, store)?;
            let ctx = RequestContext::new(owner.unwrap_or_default());
            let base_url = base_url.as_deref().unwrap_or(&config.auth.public_base_url);
            let link = links
                .mint_capability_link(
                    &ctx,
                    base_url,
                    CapabilityLinkRequest {
                        file_id: *file_id,
                        file_name: file_name.clone(),
                        permissions: *permissions,
                        expires_in_hours: *expires_in_hours,
                        max_downloads: *max_downloads,
                        share_id: *share_id,
                    },
                )
                .await?;
            output::print_item(&link, format);
        }
        LinkCommand::Inspect { link } => {
            let query = match link.split_once('?') {
                Some((_, query)) => query,
                None => link.as_str(),
            };
            let Credential::Capability { token, signature } = Credential::from_query(query)?
            else {
                return Err(AppError::malformed(
                    "Share codes carry no claims; pass a capability link",
                ));
            };

            let verifier = CapabilityVerifier::from_config(&config.auth)?;
            let report = match verifier.verify(&token, &signature, Utc::now(), None) {
                Verification::Valid(verified) => InspectReport {
                    valid: true,
                    file_id: Some(verified.claims.file_id.to_string()),
                    file_name: verified.claims.file_name.clone(),
                    permissions: Some(verified.claims.permissions.to_string()),
                    max_downloads: verified.claims.max_downloads,
                    share_id: verified.claims.share_id.map(|id| id.to_string()),
                    expires_at: verified.claims.expires_at().map(|t| t.to_rfc3339()),
                    is_expired: Some(verified.is_expired),
                },
                Verification::Invalid => InspectReport {
                    valid: false,
                    file_id: None,
                    file_name: None,
                    permissions: None,
                    max_downloads: None,
                    share_id: None,
                    expires_at: None,
                    is_expired: None,
                },
            };
            output::print_item(&report, format);
        }
    }

    Ok(())
}
