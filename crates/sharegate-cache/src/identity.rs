//! Client identity used to key rate-limit counters.

use std::fmt;
use std::net::IpAddr;

use http::HeaderMap;
use serde::{Deserialize, Serialize};

use sharegate_core::types::id::UserId;

/// Header set by reverse proxies with the original client address first.
pub const FORWARDED_FOR: &str = "x-forwarded-for";

/// Who a request is counted against.
///
/// Derived in priority order: authenticated user, then network address,
/// then a single `unknown` bucket shared by every unidentifiable client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ClientIdentity {
    /// An authenticated user.
    User(UserId),
    /// An anonymous client seen at this address.
    Address(IpAddr),
    /// Nothing identifies the client.
    Unknown,
}

impl ClientIdentity {
    /// Pick the strongest identity available.
    pub fn resolve(user: Option<UserId>, address: Option<IpAddr>) -> Self {
        match (user, address) {
            (Some(user), _) => Self::User(user),
            (None, Some(address)) => Self::Address(address),
            (None, None) => Self::Unknown,
        }
    }

    /// Resolve using the first `X-Forwarded-For` hop, falling back to the
    /// peer address of the connection.
    pub fn from_headers(user: Option<UserId>, headers: &HeaderMap, peer: Option<IpAddr>) -> Self {
        let forwarded = headers
            .get(FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
            .and_then(first_forwarded_hop);
        Self::resolve(user, forwarded.or(peer))
    }

    /// Whether this is the shared fallback bucket.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user:{id}"),
            Self::Address(addr) => write!(f, "ip:{addr}"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

fn first_forwarded_hop(value: &str) -> Option<IpAddr> {
    value.split(',').next()?.trim().parse().ok()
}
