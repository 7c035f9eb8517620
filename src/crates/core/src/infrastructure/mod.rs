//! Infrastructure layer - AI clients, integrations, events.

pub mod ai;
pub mod events;
pub mod integrations;

pub use ai::{ContentGenerator, HttpAiClient, IntentClassifier};
pub use events::{emit_agent_event, get_global_event_system, BackendEventSystem};
pub use integrations::{BookingProvider, HttpBookingProvider};
