//! Capability token issuing.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::Mac;
use serde::{Deserialize, Serialize};

use sharegate_core::config::AuthConfig;
use sharegate_core::error::AppError;
use sharegate_core::traits::random::RandomSource;

use super::claims::{CapabilityClaims, CapabilityGrant};
use super::{HmacSha256, NONCE_BYTES, check_secret};

/// A freshly minted token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedToken {
    /// base64url-encoded claims.
    pub token: String,
    /// Lowercase hex HMAC-SHA-256 of `token`.
    pub signature: String,
    /// The claims that were encoded.
    pub claims: CapabilityClaims,
}

/// Signs capability tokens with the server-held secret.
#[derive(Clone)]
pub struct CapabilitySigner {
    secret: Arc<[u8]>,
    random: Arc<dyn RandomSource>,
}

impl std::fmt::Debug for CapabilitySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilitySigner").finish_non_exhaustive()
    }
}

impl CapabilitySigner {
    /// Creates a signer from a raw secret.
    pub fn new(secret: &[u8], random: Arc<dyn RandomSource>) -> Result<Self, AppError> {
        check_secret(secret)?;
        Ok(Self {
            secret: Arc::from(secret),
            random,
        })
    }

    /// Creates a signer from auth configuration.
    pub fn from_config(config: &AuthConfig, random: Arc<dyn RandomSource>) -> Result<Self, AppError> {
        Self::new(config.share_signing_secret.as_bytes(), random)
    }

    /// Mint a token for `grant` with a fresh nonce.
    pub fn issue(&self, grant: &CapabilityGrant) -> Result<IssuedToken, AppError> {
        let mut nonce = [0u8; NONCE_BYTES];
        self.random.fill_bytes(&mut nonce);

        let claims = CapabilityClaims {
            file_id: grant.file_id,
            file_name: grant.file_name.clone(),
            permissions: grant.permissions,
            max_downloads: grant.max_downloads,
            share_id: grant.share_id,
            exp: grant.expires_at.timestamp(),
            nonce: hex::encode(nonce),
        };

        self.sign(claims)
    }

    /// Encode and sign an explicit claim set.
    pub fn sign(&self, claims: CapabilityClaims) -> Result<IssuedToken, AppError> {
        let json = serde_json::to_vec(&claims)?;
        let token = URL_SAFE_NO_PAD.encode(json);
        let signature = hex::encode(mac_for(&self.secret, token.as_bytes())?);

        Ok(IssuedToken {
            token,
            signature,
            claims,
        })
    }
}

pub(crate) fn mac_for(secret: &[u8], data: &[u8]) -> Result<[u8; 32], AppError> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::internal(format!("Invalid HMAC key: {e}")))?;
    mac.update(data);
    let tag = mac.finalize().into_bytes();
    let mut out = [0u8; 32];
    out.copy_from_slice(&tag);
    Ok(out)
}
