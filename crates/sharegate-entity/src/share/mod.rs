//! Share domain entities.

pub mod access_log;
pub mod code;
pub mod link;
pub mod model;

pub use access_log::{AccessLogEntry, AccessType, NewAccessLog};
pub use code::ShareCode;
pub use link::ShareLink;
pub use model::{NewShare, Share, SharePermission};
