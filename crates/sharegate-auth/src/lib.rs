//! # sharegate-auth
//!
//! Stateless credentials for Sharegate:
//!
//! - **capability**: HMAC-SHA-256 signed, self-contained share tokens
//!   carried as a base64url payload plus a hex signature.
//! - **code**: generation of 16-character share codes from secure randomness.

pub mod capability;
pub mod code;

pub use capability::{
    CapabilityClaims, CapabilityGrant, CapabilitySigner, CapabilityVerifier, IssuedToken,
    Verification, VerifiedToken,
};
pub use code::ShareCodeGenerator;
