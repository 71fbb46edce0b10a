//! Credential resolution: verify, authorize, record, serve.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use sharegate_auth::{CapabilityClaims, CapabilityVerifier, Verification};
use sharegate_core::error::{AppError, ErrorKind};
use sharegate_core::events::ShareEvent;
use sharegate_core::result::AppResult;
use sharegate_core::traits::clock::Clock;
use sharegate_core::traits::storage::{FileMetadata, FileServer};
use sharegate_core::types::id::{FileId, ShareId};
use sharegate_entity::share::{AccessLogEntry, AccessType, Share};

use super::credential::Credential;
use super::registry::ShareRegistry;
use crate::activity::ActivityLogger;
use crate::context::ClientContext;

/// A credential that passed every check, with usage already recorded.
#[derive(Debug, Clone)]
pub struct Authorization {
    /// The file to serve.
    pub file_id: FileId,
    /// The action that was authorized.
    pub action: AccessType,
    /// The share after its counter was bumped; absent for unbound tokens.
    pub share: Option<Share>,
    /// The access log entry written for this access.
    pub access: Option<AccessLogEntry>,
    /// Claims of the capability token, when one was presented.
    pub claims: Option<CapabilityClaims>,
}

/// What the file-storage collaborator returned.
#[derive(Debug, Clone)]
pub enum Delivery {
    /// Metadata for a view.
    View(FileMetadata),
    /// Metadata and content for a download.
    Download {
        /// File metadata.
        metadata: FileMetadata,
        /// File content.
        content: Bytes,
    },
}

/// A fully served request.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// How the request was authorized.
    pub authorization: Authorization,
    /// What was served.
    pub delivery: Delivery,
}

/// Authorization outcome without serving the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveOutcome {
    /// Whether access was granted and recorded.
    pub authorized: bool,
    /// Why access was refused.
    pub reason: Option<ErrorKind>,
    /// The share behind the credential, after recording.
    pub share: Option<Share>,
}

/// Resolves share codes and capability tokens through one authorization path.
#[derive(Debug, Clone)]
pub struct ResolutionService {
    registry: Arc<ShareRegistry>,
    verifier: CapabilityVerifier,
    files: Arc<dyn FileServer>,
    clock: Arc<dyn Clock>,
    activity: ActivityLogger,
}

impl ResolutionService {
    /// Creates a new resolution service.
    pub fn new(
        registry: Arc<ShareRegistry>,
        verifier: CapabilityVerifier,
        files: Arc<dyn FileServer>,
        clock: Arc<dyn Clock>,
        activity: ActivityLogger,
    ) -> Self {
        Self {
            registry,
            verifier,
            files,
            clock,
            activity,
        }
    }

    /// Authorize, record and serve `action` for `credential`.
    pub async fn resolve(
        &self,
        credential: &Credential,
        action: AccessType,
        client: &ClientContext,
    ) -> AppResult<Resolution> {
        let authorization = self.authorize(credential, action, client).await?;
        let delivery = self.deliver(authorization.file_id, action).await?;
        Ok(Resolution {
            authorization,
            delivery,
        })
    }

    /// Authorize and record without serving.
    ///
    /// Rejections come back as an unauthorized outcome with a reason;
    /// storage failures are still returned as errors.
    pub async fn resolve_share(
        &self,
        credential: &Credential,
        action: AccessType,
        client: &ClientContext,
    ) -> AppResult<ResolveOutcome> {
        match self.authorize(credential, action, client).await {
            Ok(authorization) => Ok(ResolveOutcome {
                authorized: true,
                reason: None,
                share: authorization.share,
            }),
            Err(e) if e.kind.is_authorization_failure() => Ok(ResolveOutcome {
                authorized: false,
                reason: Some(e.kind),
                share: None,
            }),
            Err(e) => Err(e),
        }
    }

    /// Run every check for `credential` and record the access.
    ///
    /// A rejection writes nothing and is reported to the activity sink.
    pub async fn authorize(
        &self,
        credential: &Credential,
        action: AccessType,
        client: &ClientContext,
    ) -> AppResult<Authorization> {
        let now = self.clock.now();
        let mut share_id = None;

        let result = match credential {
            Credential::ShareCode(code) => match self.registry.get_by_code(code).await {
                Ok(share) => {
                    share_id = Some(share.id);
                    self.authorize_share(share, action, client, now, None).await
                }
                Err(e) => Err(e),
            },
            Credential::Capability { token, signature } => {
                self.authorize_token(token, signature, action, client, now, &mut share_id)
                    .await
            }
        };

        match &result {
            Ok(authorization) => {
                self.activity.emit(
                    client.user_id,
                    ShareEvent::Accessed {
                        share_id: authorization.share.as_ref().map(|s| s.id),
                        file_id: authorization.file_id,
                        access_type: action.to_string(),
                        ip_address: client.ip_address.map(|ip| ip.to_string()),
                    },
                    now,
                );
            }
            Err(e) if e.kind.is_authorization_failure() => {
                warn!(
                    credential = credential.kind(),
                    share_id = ?share_id,
                    access_type = %action,
                    reason = %e.kind,
                    "Share access denied"
                );
                self.activity.emit(
                    client.user_id,
                    ShareEvent::AccessDenied {
                        share_id,
                        access_type: action.to_string(),
                        reason: e.kind,
                        ip_address: client.ip_address.map(|ip| ip.to_string()),
                    },
                    now,
                );
            }
            Err(_) => {}
        }

        result
    }

    async fn authorize_token(
        &self,
        token: &str,
        signature: &str,
        action: AccessType,
        client: &ClientContext,
        now: DateTime<Utc>,
        share_id: &mut Option<ShareId>,
    ) -> AppResult<Authorization> {
        let verified = match self.verifier.verify(token, signature, now, None) {
            Verification::Valid(verified) => verified,
            Verification::Invalid => {
                return Err(AppError::invalid_signature("Invalid share link"));
            }
        };
        if verified.is_expired {
            return Err(AppError::expired("Share link has expired"));
        }

        let claims = verified.claims;
        if !claims.permissions.allows(action) {
            return Err(AppError::permission_denied(format!(
                "Share link does not permit {action}"
            )));
        }

        match claims.share_id {
            Some(bound) => {
                *share_id = Some(bound);
                let share = self.registry.get(bound).await?;
                if share.file_id != claims.file_id {
                    return Err(AppError::not_found("Share not found"));
                }
                self.authorize_share(share, action, client, now, Some(claims))
                    .await
            }
            None => {
                debug!(file_id = %claims.file_id, access_type = %action, "Unbound capability accepted");
                Ok(Authorization {
                    file_id: claims.file_id,
                    action,
                    share: None,
                    access: None,
                    claims: Some(claims),
                })
            }
        }
    }

    async fn authorize_share(
        &self,
        share: Share,
        action: AccessType,
        client: &ClientContext,
        now: DateTime<Utc>,
        claims: Option<CapabilityClaims>,
    ) -> AppResult<Authorization> {
        share.check_access(action, now)?;

        // The store re-checks under its own lock; the check above only
        // fails fast.
        let (share, entry) = self
            .registry
            .record_access(share.id, action, &client.access_log())
            .await?;

        Ok(Authorization {
            file_id: share.file_id,
            action,
            share: Some(share),
            access: Some(entry),
            claims,
        })
    }

    async fn deliver(&self, file_id: FileId, action: AccessType) -> AppResult<Delivery> {
        let metadata = self.files.metadata(file_id).await?;
        match action {
            AccessType::View => Ok(Delivery::View(metadata)),
            AccessType::Download => {
                let content = self.files.read(file_id).await?;
                Ok(Delivery::Download { metadata, content })
            }
        }
    }
}
