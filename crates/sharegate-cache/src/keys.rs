//! Counter key builders.
//!
//! Every limiter key goes through here so policies never share a bucket.

use crate::identity::ClientIdentity;

/// Key for the counter of `identity` under `policy`.
pub fn rate_limit(policy: &str, identity: &ClientIdentity) -> String {
    format!("{policy}:{identity}")
}
