//! Rate-limit response headers.

use chrono::{DateTime, Utc};
use http::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};

use sharegate_core::types::rate_limit::RateLimitDecision;

/// Requests allowed per window.
pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
/// Requests left in the current window.
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
/// Window reset, unix seconds.
pub const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Headers describing `decision`. `Retry-After` is only set on denial.
pub fn rate_limit_headers(decision: &RateLimitDecision, now: DateTime<Utc>) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(4);
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(decision.total));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(decision.remaining));
    headers.insert(X_RATELIMIT_RESET, HeaderValue::from(decision.reset_unix()));
    if !decision.allowed {
        headers.insert(
            RETRY_AFTER,
            HeaderValue::from(decision.retry_after_seconds(now)),
        );
    }
    headers
}
