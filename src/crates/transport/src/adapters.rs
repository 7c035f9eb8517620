//! Built-in sink implementations.
//!
//! `ChannelSink` backs in-process consumers (tests, CLI, the server's SSE
//! endpoint); `LogSink` taps the stream into the log. New transports add an
//! implementation here, never bus changes.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use log::info;
use tokio::sync::mpsc;
use tripmesh_core_types::AgentEvent;

use crate::traits::{EventSink, SinkError};

static NEXT_SINK_ID: AtomicU64 = AtomicU64::new(1);

fn next_sink_id(prefix: &str) -> String {
    format!("{}-{}", prefix, NEXT_SINK_ID.fetch_add(1, Ordering::Relaxed))
}

/// Unbounded-channel sink. The receiving half drives whatever transport
/// sits behind it; a dropped receiver reads as a closed sink and the bus
/// unregisters it on the next publish.
pub struct ChannelSink {
    sink_id: String,
    tx: mpsc::UnboundedSender<AgentEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AgentEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                sink_id: next_sink_id("channel"),
                tx,
            },
            rx,
        )
    }
}

#[async_trait]
impl EventSink for ChannelSink {
    fn sink_id(&self) -> &str {
        &self.sink_id
    }

    async fn deliver(&self, event: &AgentEvent) -> Result<(), SinkError> {
        self.tx
            .send(event.clone())
            .map_err(|_| SinkError::Closed("receiver dropped".to_string()))
    }
}

/// Log-tap sink, mostly for headless runs and debugging.
pub struct LogSink {
    sink_id: String,
}

impl LogSink {
    pub fn new() -> Self {
        Self {
            sink_id: next_sink_id("log"),
        }
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventSink for LogSink {
    fn sink_id(&self) -> &str {
        &self.sink_id
    }

    async fn deliver(&self, event: &AgentEvent) -> Result<(), SinkError> {
        info!(
            "Agent event: trip_id={}, agent_id={}, status={:?}, progress={}, stage={}, message={}",
            event.trip_id,
            event.agent_id,
            event.status,
            event.clamped_progress(),
            event.stage,
            event.message
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tripmesh_core_types::AgentStatus;

    #[tokio::test]
    async fn channel_sink_reports_closed_after_receiver_drop() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);

        let event = AgentEvent {
            agent_id: "editor".to_string(),
            agent_kind: "editor".to_string(),
            status: AgentStatus::Queued,
            progress: 0,
            message: String::new(),
            stage: String::new(),
            timestamp_ms: 0,
            trip_id: "trip-1".to_string(),
        };

        match sink.deliver(&event).await {
            Err(SinkError::Closed(_)) => {}
            other => panic!("expected Closed, got {:?}", other.map(|_| ())),
        }
    }
}
