//! Capability token codec.
//!
//! Wire form: `token` is the base64url (unpadded) JSON of
//! [`CapabilityClaims`]; `sig` is the lowercase hex HMAC-SHA-256 of the
//! `token` string under the server secret. The MAC is checked before the
//! payload is decoded.

pub mod claims;
pub mod signer;
pub mod verifier;

pub use claims::{CapabilityClaims, CapabilityGrant};
pub use signer::{CapabilitySigner, IssuedToken};
pub use verifier::{CapabilityVerifier, Verification, VerifiedToken};

use hmac::Hmac;
use sha2::Sha256;

use sharegate_core::config::auth::MIN_SIGNING_SECRET_LEN;
use sharegate_core::error::AppError;

/// Query parameter carrying the encoded payload.
pub const TOKEN_PARAM: &str = "token";
/// Query parameter carrying the hex signature.
pub const SIGNATURE_PARAM: &str = "sig";

pub(crate) type HmacSha256 = Hmac<Sha256>;

/// Length of a hex-encoded HMAC-SHA-256 tag.
pub(crate) const SIGNATURE_HEX_LEN: usize = 64;

/// Random bytes in each token nonce.
pub(crate) const NONCE_BYTES: usize = 16;

pub(crate) fn check_secret(secret: &[u8]) -> Result<(), AppError> {
    if secret.len() < MIN_SIGNING_SECRET_LEN {
        return Err(AppError::configuration(format!(
            "Capability signing secret must be at least {MIN_SIGNING_SECRET_LEN} bytes"
        )));
    }
    Ok(())
}
