pub mod adapters;
pub mod event_bus;
/// TripMesh Transport Layer
///
/// Event fan-out abstraction between the core and observers, supports:
/// - in-process channels (tests, CLI)
/// - SSE (web server)
/// - log taps
pub mod traits;

pub use adapters::{ChannelSink, LogSink};
pub use event_bus::EventBus;
pub use traits::{EventSink, SinkError};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
