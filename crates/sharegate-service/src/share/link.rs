//! Public link minting for shares and capability tokens.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use sharegate_auth::capability::{SIGNATURE_PARAM, TOKEN_PARAM};
use sharegate_auth::{CapabilityGrant, CapabilitySigner};
use sharegate_core::error::{AppError, ErrorKind};
use sharegate_core::result::AppResult;
use sharegate_core::traits::clock::Clock;
use sharegate_core::types::id::{FileId, ShareId};
use sharegate_entity::share::{ShareCode, ShareLink, SharePermission};

use super::registry::{CreateShareRequest, ShareRegistry, validate_grant};
use crate::context::RequestContext;

/// Request to mint a signed capability link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityLinkRequest {
    /// The file to grant access to.
    pub file_id: FileId,
    /// Display name embedded in the token.
    pub file_name: Option<String>,
    /// Granted actions.
    pub permissions: SharePermission,
    /// Lifetime in hours.
    pub expires_in_hours: u32,
    /// Download cap. Advisory unless `share_id` binds the token to a share.
    pub max_downloads: Option<u32>,
    /// Share whose counters track this link.
    pub share_id: Option<ShareId>,
}

/// A minted capability link.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityLink {
    /// Full URL carrying `token` and `sig` query parameters.
    pub url: String,
    /// The encoded payload.
    pub token: String,
    /// Hex signature of `token`.
    pub signature: String,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
}

/// Builds the URLs owners hand out.
#[derive(Debug, Clone)]
pub struct LinkService {
    registry: Arc<ShareRegistry>,
    signer: CapabilitySigner,
    clock: Arc<dyn Clock>,
    public_base_url: Url,
}

impl LinkService {
    /// Creates a link service publishing under `public_base_url`.
    pub fn new(
        registry: Arc<ShareRegistry>,
        signer: CapabilitySigner,
        clock: Arc<dyn Clock>,
        public_base_url: &str,
    ) -> AppResult<Self> {
        let public_base_url = Url::parse(public_base_url).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Invalid public base URL '{public_base_url}'"),
                e,
            )
        })?;
        if public_base_url.cannot_be_a_base() {
            return Err(AppError::configuration(format!(
                "Public base URL '{public_base_url}' cannot carry a path"
            )));
        }
        Ok(Self {
            registry,
            signer,
            clock,
            public_base_url,
        })
    }

    /// Public URL of a share code.
    pub fn share_url(&self, code: &ShareCode) -> String {
        let mut url = self.public_base_url.clone();
        let path = format!(
            "{}/{}/{}",
            url.path().trim_end_matches('/'),
            self.registry.config().share_path.trim_matches('/'),
            code
        );
        url.set_path(&path);
        url.into()
    }

    /// Mint a share and return its public link.
    pub async fn mint_share(
        &self,
        ctx: &RequestContext,
        req: CreateShareRequest,
    ) -> AppResult<ShareLink> {
        let share = self.registry.create_share(ctx, req).await?;
        let public_url = self.share_url(&share.share_code);
        Ok(ShareLink {
            share_code: share.share_code,
            public_url,
            expires_at: share.expires_at,
        })
    }

    /// Sign a capability token and attach it to `base_url` as query parameters.
    ///
    /// A `share_id` binding must name a live share of the same file owned by
    /// the caller.
    pub async fn mint_capability_link(
        &self,
        ctx: &RequestContext,
        base_url: &str,
        req: CapabilityLinkRequest,
    ) -> AppResult<CapabilityLink> {
        validate_grant(self.registry.config(), req.expires_in_hours, req.max_downloads)?;
        let mut url = Url::parse(base_url)
            .map_err(|e| AppError::validation(format!("Invalid link base URL: {e}")))?;
        if let Some(share_id) = req.share_id {
            self.check_binding(ctx, share_id, req.file_id).await?;
        }

        let expires_at = self.clock.now() + TimeDelta::hours(i64::from(req.expires_in_hours));
        let issued = self.signer.issue(&CapabilityGrant {
            file_id: req.file_id,
            file_name: req.file_name,
            permissions: req.permissions,
            max_downloads: req.max_downloads,
            share_id: req.share_id,
            expires_at,
        })?;

        url.query_pairs_mut()
            .append_pair(TOKEN_PARAM, &issued.token)
            .append_pair(SIGNATURE_PARAM, &issued.signature);

        info!(
            file_id = %req.file_id,
            share_id = ?req.share_id,
            permissions = %req.permissions,
            "Capability link minted"
        );

        Ok(CapabilityLink {
            url: url.into(),
            token: issued.token,
            signature: issued.signature,
            expires_at,
        })
    }

    async fn check_binding(
        &self,
        ctx: &RequestContext,
        share_id: ShareId,
        file_id: FileId,
    ) -> AppResult<()> {
        let share = self.registry.get(share_id).await?;
        if share.shared_by != ctx.user_id {
            return Err(AppError::permission_denied(
                "Only the owner can bind links to this share",
            ));
        }
        if share.file_id != file_id {
            return Err(AppError::validation(format!(
                "Share {share_id} does not cover file {file_id}"
            )));
        }
        if !share.is_live(self.clock.now()) {
            return Err(AppError::expired(
                "Cannot bind a link to a revoked or expired share",
            ));
        }
        Ok(())
    }
}
