//! The two kinds of credential a visitor can present.

use std::fmt;

use url::form_urlencoded;

use sharegate_auth::capability::{SIGNATURE_PARAM, TOKEN_PARAM};
use sharegate_core::error::AppError;
use sharegate_core::result::AppResult;
use sharegate_entity::share::ShareCode;

/// Query parameter carrying a share code.
pub const CODE_PARAM: &str = "code";

/// A share code or a signed capability token.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// A code naming a stored share.
    ShareCode(ShareCode),
    /// A self-contained signed token.
    Capability {
        /// base64url payload.
        token: String,
        /// Hex signature.
        signature: String,
    },
}

impl Credential {
    /// Classify a presented value.
    ///
    /// With a signature the value is a capability token; without one it
    /// must be a well-formed share code.
    pub fn parse(code_or_token: &str, signature: Option<&str>) -> AppResult<Self> {
        match signature {
            Some(signature) => {
                if code_or_token.is_empty() || signature.is_empty() {
                    return Err(AppError::malformed(
                        "Capability links need both a token and a signature",
                    ));
                }
                Ok(Self::Capability {
                    token: code_or_token.to_string(),
                    signature: signature.to_string(),
                })
            }
            None => ShareCode::parse(code_or_token).map(Self::ShareCode),
        }
    }

    /// Read a credential from a URL query string.
    ///
    /// `token` with `sig` wins over `code`. Other parameters are ignored.
    pub fn from_query(query: &str) -> AppResult<Self> {
        let mut token = None;
        let mut signature = None;
        let mut code = None;

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match &*key {
                TOKEN_PARAM => token = Some(value.into_owned()),
                SIGNATURE_PARAM => signature = Some(value.into_owned()),
                CODE_PARAM => code = Some(value.into_owned()),
                _ => {}
            }
        }

        match (token, signature, code) {
            (Some(token), Some(signature), _) => Self::parse(&token, Some(&signature)),
            (Some(_), None, _) | (None, Some(_), _) => Err(AppError::malformed(
                "Capability links need both a token and a signature",
            )),
            (None, None, Some(code)) => Self::parse(&code, None),
            (None, None, None) => Err(AppError::malformed("No share credential supplied")),
        }
    }

    /// `"share_code"` or `"capability"`, for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ShareCode(_) => "share_code",
            Self::Capability { .. } => "capability",
        }
    }
}

// Tokens are bearer secrets; keep them out of debug output.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShareCode(code) => f.debug_tuple("ShareCode").field(code).finish(),
            Self::Capability { .. } => f.debug_struct("Capability").finish_non_exhaustive(),
        }
    }
}
