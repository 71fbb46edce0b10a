//! Share administration CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use sharegate_core::config::AppConfig;
use sharegate_core::error::AppError;
use sharegate_core::types::id::{FileId, ShareId, UserId};
use sharegate_core::types::pagination::PageRequest;
use sharegate_entity::share::{AccessLogEntry, Share, SharePermission};
use sharegate_service::{CreateShareRequest, RequestContext};

use crate::output::{self, OutputFormat};

/// Arguments for share commands
#[derive(Debug, Args)]
pub struct ShareArgs {
    /// Share subcommand
    #[command(subcommand)]
    pub command: ShareCommand,
}

/// Share subcommands
#[derive(Debug, Subcommand)]
pub enum ShareCommand {
    /// Mint a share on behalf of a user
    Create {
        /// Owner of the share
        #[arg(long)]
        owner: UserId,
        /// Shared file
        #[arg(long)]
        file_id: FileId,
        /// view, download or both
        #[arg(short, long, default_value = "view")]
        permissions: SharePermission,
        /// Lifetime in hours
        #[arg(short, long, default_value_t = 24)]
        expires_in_hours: u32,
        /// Download cap
        #[arg(short, long)]
        max_downloads: Option<u32>,
    },
    /// List shares minted by a user
    List {
        /// Owner of the shares
        #[arg(long)]
        owner: UserId,
        /// Page number
        #[arg(long, default_value_t = 1)]
        page: u64,
        /// Page size
        #[arg(long, default_value_t = 20)]
        page_size: u64,
    },
    /// List live shares of a file
    Active {
        /// Shared file
        #[arg(long)]
        file_id: FileId,
    },
    /// Revoke one share
    Revoke {
        /// Owner of the share
        #[arg(long)]
        owner: UserId,
        /// Share to revoke
        share_id: ShareId,
    },
    /// Revoke every share of a file
    RevokeAll {
        /// Shared file
        #[arg(long)]
        file_id: FileId,
    },
    /// Show the access log of a share
    Log {
        /// Owner of the share
        #[arg(long)]
        owner: UserId,
        /// Share to inspect
        share_id: ShareId,
    },
}

/// Share display row for table output
#[derive(Debug, Serialize, Tabled)]
struct ShareRow {
    /// Share ID
    id: String,
    /// Share code
    code: String,
    /// File ID
    file_id: String,
    /// Permissions
    permissions: String,
    /// Downloads, with cap
    downloads: String,
    /// Views
    views: i32,
    /// Status
    status: String,
    /// Expiry
    expires_at: String,
}

impl ShareRow {
    fn from_share(share: &Share, now: chrono::DateTime<chrono::Utc>) -> Self {
        let status = if !share.is_active {
            "revoked"
        } else if share.is_expired(now) {
            "expired"
        } else if share.is_exhausted() {
            "exhausted"
        } else {
            "active"
        };
        Self {
            id: share.id.to_string(),
            code: share.share_code.to_string(),
            file_id: share.file_id.to_string(),
            permissions: share.permissions.to_string(),
            downloads: match share.max_downloads {
                Some(max) => format!("{}/{max}", share.download_count),
                None => share.download_count.to_string(),
            },
            views: share.view_count,
            status: status.to_string(),
            expires_at: share.expires_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Access log display row for table output
#[derive(Debug, Serialize, Tabled)]
struct AccessRow {
    /// Action
    action: String,
    /// Client IP
    ip_address: String,
    /// User agent
    user_agent: String,
    /// Timestamp
    accessed_at: String,
}

impl From<&AccessLogEntry> for AccessRow {
    fn from(entry: &AccessLogEntry) -> Self {
        Self {
            action: entry.access_type.as_str().to_string(),
            ip_address: entry.ip_address.clone().unwrap_or_else(|| "-".to_string()),
            user_agent: entry.user_agent.clone().unwrap_or_else(|| "-".to_string()),
            accessed_at: entry.accessed_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Execute share commands
pub async fn execute(
    args: &ShareArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    config.validate()?;
    let store = super::connect_store(config).await?;
    let (registry, links) = super::sharing(config, store)?;
    let now = chrono::Utc::now();

    match &args.command {
        ShareCommand::Create {
            owner,
            file_id,
            permissions,
            expires_in_hours,
            max_downloads,
        } => {
            let link = links
                .mint_share(
                    &RequestContext::new(*owner),
                    CreateShareRequest {
                        file_id: *file_id,
                        permissions: *permissions,
                        expires_in_hours: *expires_in_hours,
                        max_downloads: *max_downloads,
                    },
                )
                .await?;
            output::print_item(&link, format);
        }
        ShareCommand::List {
            owner,
            page,
            page_size,
        } => {
            let shares = registry
                .list_owned(
                    &RequestContext::new(*owner),
                    PageRequest::new(*page, *page_size),
                )
                .await?;
            let rows: Vec<ShareRow> = shares
                .items
                .iter()
                .map(|s| ShareRow::from_share(s, now))
                .collect();
            output::print_list(&rows, format);
            if format == OutputFormat::Table {
                println!(
                    "Page {}/{} ({} shares)",
                    shares.page, shares.total_pages, shares.total_items
                );
            }
        }
        ShareCommand::Active { file_id } => {
            let shares = registry.get_active_shares(*file_id).await?;
            let rows: Vec<ShareRow> = shares
                .iter()
                .map(|s| ShareRow::from_share(s, now))
                .collect();
            output::print_list(&rows, format);
        }
        ShareCommand::Revoke { owner, share_id } => {
            registry
                .revoke(&RequestContext::new(*owner), *share_id)
                .await?;
            output::print_success(&format!("Share {share_id} revoked"));
        }
        ShareCommand::RevokeAll { file_id } => {
            let revoked = registry.revoke_all(*file_id).await?;
            output::print_success(&format!("Revoked {revoked} share(s) of file {file_id}"));
        }
        ShareCommand::Log { owner, share_id } => {
            let entries = registry
                .access_log(&RequestContext::new(*owner), *share_id)
                .await?;
            let rows: Vec<AccessRow> = entries.iter().map(AccessRow::from).collect();
            output::print_list(&rows, format);
        }
    }

    Ok(())
}
