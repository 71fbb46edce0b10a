//! # sharegate-entity
//!
//! Entity models for Sharegate. Every struct in this crate represents a
//! database table row or a domain value object. Database entities derive
//! `sqlx::FromRow` in addition to `Serialize`/`Deserialize`.

pub mod share;

pub use share::{
    AccessLogEntry, AccessType, NewAccessLog, NewShare, Share, ShareCode, ShareLink,
    SharePermission,
};
