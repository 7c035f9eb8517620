//! Per-trip event fan-out.
//!
//! The bus keys subscriber lists by trip id and isolates sink failure: a
//! throwing sink never blocks delivery to other sinks or later events.
//! Sinks reporting a terminal condition are unregistered automatically so
//! dead subscribers do not accumulate.

use std::sync::Arc;

use dashmap::DashMap;
use log::{debug, warn};
use tripmesh_core_types::AgentEvent;

use crate::traits::{EventSink, SinkError};

pub struct EventBus {
    sinks: DashMap<String, Vec<Arc<dyn EventSink>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            sinks: DashMap::new(),
        }
    }

    pub fn register(&self, trip_id: &str, sink: Arc<dyn EventSink>) {
        debug!(
            "Registering event sink: trip_id={}, sink_id={}",
            trip_id,
            sink.sink_id()
        );
        self.sinks.entry(trip_id.to_string()).or_default().push(sink);
    }

    pub fn unregister(&self, trip_id: &str, sink_id: &str) {
        if let Some(mut entry) = self.sinks.get_mut(trip_id) {
            entry.retain(|s| s.sink_id() != sink_id);
        }
        self.sinks.remove_if(trip_id, |_, sinks| sinks.is_empty());
    }

    pub fn subscriber_count(&self, trip_id: &str) -> usize {
        self.sinks.get(trip_id).map(|s| s.len()).unwrap_or(0)
    }

    /// Fans the event out to every sink registered for this trip.
    ///
    /// Delivery is sequential per publish call, which preserves per-sink
    /// ordering for one trip id. Closed sinks are dropped after the sweep.
    pub async fn publish(&self, trip_id: &str, event: &AgentEvent) {
        // Snapshot outside the map guard; deliver() suspends.
        let snapshot: Vec<Arc<dyn EventSink>> = match self.sinks.get(trip_id) {
            Some(entry) => entry.clone(),
            None => return,
        };

        let mut closed: Vec<String> = Vec::new();
        for sink in &snapshot {
            match sink.deliver(event).await {
                Ok(()) => {}
                Err(SinkError::Closed(reason)) => {
                    debug!(
                        "Event sink closed, dropping: trip_id={}, sink_id={}, reason={}",
                        trip_id,
                        sink.sink_id(),
                        reason
                    );
                    closed.push(sink.sink_id().to_string());
                }
                Err(SinkError::Delivery(reason)) => {
                    warn!(
                        "Event delivery failed, keeping sink: trip_id={}, sink_id={}, reason={}",
                        trip_id,
                        sink.sink_id(),
                        reason
                    );
                }
            }
        }

        for sink_id in closed {
            self.unregister(trip_id, &sink_id);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tripmesh_core_types::AgentStatus;

    struct CountingSink {
        id: String,
        delivered: AtomicUsize,
        fail_with: Option<fn() -> SinkError>,
    }

    #[async_trait]
    impl EventSink for CountingSink {
        fn sink_id(&self) -> &str {
            &self.id
        }

        async fn deliver(&self, _event: &AgentEvent) -> Result<(), SinkError> {
            if let Some(make_err) = self.fail_with {
                return Err(make_err());
            }
            self.delivered.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn sink(id: &str, fail_with: Option<fn() -> SinkError>) -> Arc<CountingSink> {
        Arc::new(CountingSink {
            id: id.to_string(),
            delivered: AtomicUsize::new(0),
            fail_with,
        })
    }

    fn event(trip_id: &str) -> AgentEvent {
        AgentEvent {
            agent_id: "planner".to_string(),
            agent_kind: "planner".to_string(),
            status: AgentStatus::Running,
            progress: 40,
            message: "working".to_string(),
            stage: "generate".to_string(),
            timestamp_ms: 0,
            trip_id: trip_id.to_string(),
        }
    }

    #[tokio::test]
    async fn failing_sink_does_not_block_others() {
        let bus = EventBus::new();
        let bad = sink("bad", Some(|| SinkError::Delivery("boom".to_string())));
        let good = sink("good", None);
        bus.register("trip-1", bad.clone());
        bus.register("trip-1", good.clone());

        bus.publish("trip-1", &event("trip-1")).await;
        bus.publish("trip-1", &event("trip-1")).await;

        assert_eq!(good.delivered.load(Ordering::SeqCst), 2);
        // Transient failure keeps the sink subscribed.
        assert_eq!(bus.subscriber_count("trip-1"), 2);
    }

    #[tokio::test]
    async fn closed_sink_is_unregistered() {
        let bus = EventBus::new();
        let closed = sink("closed", Some(|| SinkError::Closed("gone".to_string())));
        let good = sink("good", None);
        bus.register("trip-1", closed);
        bus.register("trip-1", good.clone());

        bus.publish("trip-1", &event("trip-1")).await;
        assert_eq!(bus.subscriber_count("trip-1"), 1);

        bus.publish("trip-1", &event("trip-1")).await;
        assert_eq!(good.delivered.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn publish_is_scoped_to_trip_id() {
        let bus = EventBus::new();
        let a = sink("a", None);
        let b = sink("b", None);
        bus.register("trip-a", a.clone());
        bus.register("trip-b", b.clone());

        bus.publish("trip-a", &event("trip-a")).await;

        assert_eq!(a.delivered.load(Ordering::SeqCst), 1);
        assert_eq!(b.delivered.load(Ordering::SeqCst), 0);
    }
}
