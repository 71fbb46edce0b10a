//! Caller context for owner operations and visitor requests.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use sharegate_cache::ClientIdentity;
use sharegate_core::types::id::UserId;
use sharegate_entity::share::NewAccessLog;

/// Context of an authenticated owner request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting user.
    pub user_id: UserId,
    /// IP address of the request origin.
    pub ip_address: Option<IpAddr>,
}

impl RequestContext {
    /// Creates a context for `user_id`.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            ip_address: None,
        }
    }
}

/// What is known about a visitor presenting a credential.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientContext {
    /// Signed-in user, if any.
    pub user_id: Option<UserId>,
    /// Client address.
    pub ip_address: Option<IpAddr>,
    /// `User-Agent` header value.
    pub user_agent: Option<String>,
    /// `Referer` header value.
    pub referrer: Option<String>,
}

impl ClientContext {
    /// An anonymous client at `ip_address`.
    pub fn anonymous(ip_address: IpAddr) -> Self {
        Self {
            ip_address: Some(ip_address),
            ..Self::default()
        }
    }

    /// The identity rate limits are keyed by.
    pub fn identity(&self) -> ClientIdentity {
        ClientIdentity::resolve(self.user_id, self.ip_address)
    }

    /// Details copied into an access log entry.
    pub fn access_log(&self) -> NewAccessLog {
        NewAccessLog {
            ip_address: self.ip_address.map(|ip| ip.to_string()),
            user_agent: self.user_agent.clone(),
            referrer: self.referrer.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_prefers_user() {
        let user = UserId::new();
        let client = ClientContext {
            user_id: Some(user),
            ip_address: Some("198.51.100.1".parse().unwrap()),
            ..ClientContext::default()
        };
        assert_eq!(client.identity(), ClientIdentity::User(user));
        assert_eq!(ClientContext::default().identity(), ClientIdentity::Unknown);
    }

    #[test]
    fn test_access_log_copies_headers() {
        let client = ClientContext {
            user_agent: Some("curl/8.5".to_string()),
            ..ClientContext::anonymous("203.0.113.5".parse().unwrap())
        };
        let log = client.access_log();
        assert_eq!(log.ip_address.as_deref(), Some("203.0.113.5"));
        assert_eq!(log.user_agent.as_deref(), Some("curl/8.5"));
        assert_eq!(log.referrer, None);
    }
}
