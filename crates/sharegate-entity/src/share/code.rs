//! Share code value type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use sharegate_core::error::AppError;

/// Number of random bytes behind a share code.
pub const SHARE_CODE_BYTES: usize = 8;
/// Length of the rendered code in characters.
pub const SHARE_CODE_LEN: usize = SHARE_CODE_BYTES * 2;

/// A 16-character uppercase hexadecimal share code (`^[A-F0-9]{16}$`).
///
/// Immutable and globally unique for the life of the system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(try_from = "String", into = "String")]
#[sqlx(transparent)]
pub struct ShareCode(String);

impl ShareCode {
    /// Render a code from raw random bytes.
    pub fn from_bytes(bytes: [u8; SHARE_CODE_BYTES]) -> Self {
        Self(hex::encode_upper(bytes))
    }

    /// Validate and wrap a presented code. Lowercase input is rejected.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        if Self::is_well_formed(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(AppError::malformed("Share code must be 16 uppercase hex characters"))
        }
    }

    /// Whether `raw` matches `^[A-F0-9]{16}$`.
    pub fn is_well_formed(raw: &str) -> bool {
        raw.len() == SHARE_CODE_LEN
            && raw
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b))
    }

    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShareCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ShareCode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ShareCode {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if Self::is_well_formed(&value) {
            Ok(Self(value))
        } else {
            Err(AppError::malformed("Share code must be 16 uppercase hex characters"))
        }
    }
}

impl From<ShareCode> for String {
    fn from(code: ShareCode) -> Self {
        code.0
    }
}

impl AsRef<str> for ShareCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
