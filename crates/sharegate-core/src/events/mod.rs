//! Domain events emitted by the sharing and abuse-control core.
//!
//! Events are handed to the [`ActivitySink`](crate::traits::ActivitySink)
//! collaborator. Delivery is best effort.

pub mod rate_limit;
pub mod share;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::id::UserId;

pub use rate_limit::RateLimitEvent;
pub use share::ShareEvent;

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The user who caused the event (if known).
    pub actor_id: Option<UserId>,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of all domain event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum EventPayload {
    /// A share-related event.
    Share(ShareEvent),
    /// A rate-limit event.
    RateLimit(RateLimitEvent),
}

impl DomainEvent {
    /// Create a new domain event stamped at `timestamp`.
    pub fn new(actor_id: Option<UserId>, payload: EventPayload, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            actor_id,
            payload,
        }
    }

    /// Short event name for log lines.
    pub fn name(&self) -> &'static str {
        match &self.payload {
            EventPayload::Share(event) => event.name(),
            EventPayload::RateLimit(event) => event.name(),
        }
    }
}

impl From<ShareEvent> for EventPayload {
    fn from(event: ShareEvent) -> Self {
        Self::Share(event)
    }
}

impl From<RateLimitEvent> for EventPayload {
    fn from(event: RateLimitEvent) -> Self {
        Self::RateLimit(event)
    }
}
