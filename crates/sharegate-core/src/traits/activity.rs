//! Activity logging sink.

use async_trait::async_trait;
use tracing::info;

use crate::events::DomainEvent;
use crate::result::AppResult;

/// Receives domain events for audit and activity feeds.
///
/// Callers never wait on the sink for correctness; a failing sink must not
/// block or fail the operation that emitted the event.
#[async_trait]
pub trait ActivitySink: Send + Sync + std::fmt::Debug + 'static {
    /// Record a single event.
    async fn record(&self, event: DomainEvent) -> AppResult<()>;
}

/// Sink that writes events to the tracing pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingActivitySink;

#[async_trait]
impl ActivitySink for TracingActivitySink {
    async fn record(&self, event: DomainEvent) -> AppResult<()> {
        let payload = serde_json::to_string(&event.payload)?;
        info!(
            target: "sharegate::activity",
            event_id = %event.id,
            event = event.name(),
            actor_id = ?event.actor_id,
            payload = %payload,
            "Activity recorded"
        );
        Ok(())
    }
}
