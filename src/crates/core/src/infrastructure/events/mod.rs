//! Event system module

pub mod event_system;

pub use event_system::{emit_agent_event, get_global_event_system, BackendEventSystem};
