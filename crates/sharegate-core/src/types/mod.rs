//! Shared value types: identifiers, pagination, and rate-limit decisions.

pub mod id;
pub mod pagination;
pub mod rate_limit;

pub use id::{AccessLogId, FileId, ShareId, UserId};
pub use pagination::{PageRequest, PageResponse};
pub use rate_limit::{RateLimitDecision, RateLimitPolicy};
