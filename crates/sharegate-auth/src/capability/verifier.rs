//! Capability token verification.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use hmac::Mac;
use serde::{Deserialize, Serialize};
use tracing::debug;

use sharegate_core::config::AuthConfig;
use sharegate_core::error::AppError;

use super::claims::CapabilityClaims;
use super::{HmacSha256, SIGNATURE_HEX_LEN, check_secret};

/// Upper bound on accepted token length; real tokens are a few hundred bytes.
const MAX_TOKEN_LEN: usize = 4096;

/// A token whose signature checked out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedToken {
    /// Decoded claims.
    pub claims: CapabilityClaims,
    /// `now > exp`.
    pub is_expired: bool,
    /// Uses left, when the caller supplied a usage count and the token has a cap.
    pub remaining_uses: Option<u32>,
}

/// Result of verifying a token.
///
/// Every failure collapses into [`Verification::Invalid`] without saying
/// which check failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// Bad signature, bad encoding or bad payload.
    Invalid,
    /// Authentic token; expiry is reported, not enforced.
    Valid(VerifiedToken),
}

impl Verification {
    /// Whether the signature checked out.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

/// Verifies capability tokens against the server-held secret.
#[derive(Clone)]
pub struct CapabilityVerifier {
    secret: Arc<[u8]>,
}

impl std::fmt::Debug for CapabilityVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityVerifier").finish_non_exhaustive()
    }
}

impl CapabilityVerifier {
    /// Creates a verifier from a raw secret.
    pub fn new(secret: &[u8]) -> Result<Self, AppError> {
        check_secret(secret)?;
        Ok(Self {
            secret: Arc::from(secret),
        })
    }

    /// Creates a verifier from auth configuration.
    pub fn from_config(config: &AuthConfig) -> Result<Self, AppError> {
        Self::new(config.share_signing_secret.as_bytes())
    }

    /// Verify `token` against `signature` at `now`.
    ///
    /// The MAC is always computed and compared in constant time before the
    /// payload is decoded. `used` is the caller's usage count for
    /// `remaining_uses`.
    pub fn verify(
        &self,
        token: &str,
        signature: &str,
        now: DateTime<Utc>,
        used: Option<u32>,
    ) -> Verification {
        let token_ok = is_token_encoding(token);
        let presented = decode_signature(signature);

        let Ok(mut mac) = HmacSha256::new_from_slice(&self.secret) else {
            return Verification::Invalid;
        };
        if token_ok {
            mac.update(token.as_bytes());
        }
        let tag = presented.unwrap_or([0u8; 32]);
        let mac_ok = mac.verify_slice(&tag).is_ok();

        if !(token_ok && presented.is_some() && mac_ok) {
            debug!("Capability token rejected");
            return Verification::Invalid;
        }

        let Some(claims) = decode_claims(token) else {
            debug!("Capability token rejected");
            return Verification::Invalid;
        };

        let is_expired = claims.is_expired_at(now);
        let remaining_uses = claims
            .max_downloads
            .zip(used)
            .map(|(max, used)| max.saturating_sub(used));

        Verification::Valid(VerifiedToken {
            claims,
            is_expired,
            remaining_uses,
        })
    }

    /// Verify and require the token to be unexpired.
    ///
    /// Maps an invalid token to `InvalidSignature` and an expired one to
    /// `Expired`.
    pub fn verify_active(
        &self,
        token: &str,
        signature: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifiedToken, AppError> {
        match self.verify(token, signature, now, None) {
            Verification::Invalid => Err(AppError::invalid_signature("Invalid share link")),
            Verification::Valid(verified) if verified.is_expired => {
                Err(AppError::expired("Share link has expired"))
            }
            Verification::Valid(verified) => Ok(verified),
        }
    }
}

fn is_token_encoding(token: &str) -> bool {
    !token.is_empty()
        && token.len() <= MAX_TOKEN_LEN
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Exactly 64 lowercase hex characters.
fn decode_signature(signature: &str) -> Option<[u8; 32]> {
    if signature.len() != SIGNATURE_HEX_LEN
        || !signature
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    {
        return None;
    }
    let mut out = [0u8; 32];
    hex::decode_to_slice(signature, &mut out).ok()?;
    Some(out)
}

fn decode_claims(token: &str) -> Option<CapabilityClaims> {
    let bytes = URL_SAFE_NO_PAD.decode(token).ok()?;
    serde_json::from_slice(&bytes).ok()
}
