//! Unified application error types for Sharegate.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. Authorization outcomes and storage
//! failures share the type but never share a [`ErrorKind`], so callers can
//! branch on the kind instead of parsing messages.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// A capability token failed signature verification or could not be decoded.
    InvalidSignature,
    /// The credential is past its expiry or the share has been revoked.
    Expired,
    /// The share code is unknown, or the share does not belong to the file.
    NotFound,
    /// The requested action is not covered by the granted permissions.
    PermissionDenied,
    /// The download cap of the share has been reached.
    QuotaExceeded,
    /// A rate limit was exceeded.
    RateLimited,
    /// The credential or request is structurally malformed.
    MalformedInput,
    /// Input validation failed (out-of-range expiry, download cap, etc.).
    Validation,
    /// A unique constraint was violated (share-code collision).
    Conflict,
    /// The backing store is temporarily unavailable.
    Unavailable,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl ErrorKind {
    /// HTTP status code conventionally used for this kind.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidSignature => 401,
            Self::Expired => 410,
            Self::NotFound => 404,
            Self::PermissionDenied => 403,
            Self::QuotaExceeded => 403,
            Self::RateLimited => 429,
            Self::MalformedInput => 400,
            Self::Validation => 400,
            Self::Conflict => 409,
            Self::Unavailable => 503,
            Self::Configuration | Self::Serialization | Self::Internal => 500,
        }
    }

    /// Whether this kind is a rejection of the caller's credential or action,
    /// as opposed to an infrastructure failure.
    pub fn is_authorization_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidSignature
                | Self::Expired
                | Self::NotFound
                | Self::PermissionDenied
                | Self::QuotaExceeded
                | Self::RateLimited
                | Self::MalformedInput
        )
    }

    /// Whether the caller should retry the operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict | Self::Unavailable)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSignature => write!(f, "INVALID_SIGNATURE"),
            Self::Expired => write!(f, "EXPIRED"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::PermissionDenied => write!(f, "PERMISSION_DENIED"),
            Self::QuotaExceeded => write!(f, "QUOTA_EXCEEDED"),
            Self::RateLimited => write!(f, "RATE_LIMITED"),
            Self::MalformedInput => write!(f, "MALFORMED_INPUT"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout Sharegate.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid-signature error.
    pub fn invalid_signature(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidSignature, message)
    }

    /// Create an expired error.
    pub fn expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Expired, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a permission-denied error.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PermissionDenied, message)
    }

    /// Create a quota-exceeded error.
    pub fn quota_exceeded(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::QuotaExceeded, message)
    }

    /// Create a rate-limited error.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimited, message)
    }

    /// Create a malformed-input error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedInput, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unavailable, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
