//! Fire-and-forget activity logging.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use sharegate_core::events::{DomainEvent, EventPayload};
use sharegate_core::traits::activity::ActivitySink;
use sharegate_core::types::id::UserId;

/// Hands domain events to the activity sink on a spawned task.
///
/// The emitting operation never waits on the sink; failures are logged.
#[derive(Debug, Clone)]
pub struct ActivityLogger {
    sink: Arc<dyn ActivitySink>,
}

impl ActivityLogger {
    /// Creates a logger over `sink`.
    pub fn new(sink: Arc<dyn ActivitySink>) -> Self {
        Self { sink }
    }

    /// Emit one event.
    pub fn emit(
        &self,
        actor_id: Option<UserId>,
        payload: impl Into<EventPayload>,
        at: DateTime<Utc>,
    ) {
        let event = DomainEvent::new(actor_id, payload.into(), at);
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            let name = event.name();
            if let Err(e) = sink.record(event).await {
                warn!(event = name, error = %e, "Failed to record activity");
            }
        });
    }
}
