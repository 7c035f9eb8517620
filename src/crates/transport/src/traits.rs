//! Transport abstraction: anything that can receive agent events.

use async_trait::async_trait;
use thiserror::Error;
use tripmesh_core_types::AgentEvent;

#[derive(Debug, Error)]
pub enum SinkError {
    /// The subscriber is gone for good; the bus drops the sink.
    #[error("sink closed: {0}")]
    Closed(String),
    /// Transient delivery failure; the bus logs and keeps the sink.
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// One event subscriber. Implementations exist per transport (in-process
/// channel, SSE connection, log tap...); adding a transport means adding a
/// sink, not changing the bus.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Stable id within the bus, used for unregistration.
    fn sink_id(&self) -> &str;

    /// Delivers one event. Events for one trip arrive in publish order.
    async fn deliver(&self, event: &AgentEvent) -> Result<(), SinkError>;
}
