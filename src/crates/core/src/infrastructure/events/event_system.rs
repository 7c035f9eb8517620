//! Global backend event system.
//!
//! Thin ownership layer over the transport `EventBus`: the core publishes
//! typed agent events here; transports subscribe per trip id with their own
//! sink implementations.

use std::sync::{Arc, OnceLock};

use tripmesh_core_types::AgentEvent;
use tripmesh_transport::{EventBus, EventSink};

pub struct BackendEventSystem {
    bus: Arc<EventBus>,
}

impl BackendEventSystem {
    pub fn new() -> Self {
        Self {
            bus: Arc::new(EventBus::new()),
        }
    }

    pub fn register_sink(&self, trip_id: &str, sink: Arc<dyn EventSink>) {
        self.bus.register(trip_id, sink);
    }

    pub fn unregister_sink(&self, trip_id: &str, sink_id: &str) {
        self.bus.unregister(trip_id, sink_id);
    }

    pub fn subscriber_count(&self, trip_id: &str) -> usize {
        self.bus.subscriber_count(trip_id)
    }

    /// Fans the event out to every sink subscribed to its trip. Sink
    /// failures are isolated inside the bus; emitting never fails.
    pub async fn emit(&self, event: AgentEvent) {
        self.bus.publish(&event.trip_id, &event).await;
    }
}

impl Default for BackendEventSystem {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_EVENT_SYSTEM: OnceLock<Arc<BackendEventSystem>> = OnceLock::new();

pub fn get_global_event_system() -> Arc<BackendEventSystem> {
    GLOBAL_EVENT_SYSTEM
        .get_or_init(|| Arc::new(BackendEventSystem::new()))
        .clone()
}

pub async fn emit_agent_event(event: AgentEvent) {
    get_global_event_system().emit(event).await;
}
