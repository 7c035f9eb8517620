// TripMesh Core Library - Platform-agnostic business logic
// Four-layer architecture: Util -> Infrastructure -> Service -> Agentic

pub mod agentic; // Agentic layer - agent contract, registry, orchestration
pub mod infrastructure; // Infrastructure layer - AI clients, integrations, events
pub mod service; // Service layer - plan state, change engine, revisions, config
pub mod util; // Utility layer - errors, ids, helpers

// Export main types
pub use util::errors::*;
pub use util::ids::*;

// Export service layer components
pub use service::{
    config::ServerConfig,
    plan::{ApplyOutcome, CreateTripRequest, MemoryRevisionStore, PlanService, RevisionStore},
};

// Export infrastructure components
pub use infrastructure::{
    ai::{ContentGenerator, HttpAiClient, IntentClassifier},
    events::{emit_agent_event, get_global_event_system, BackendEventSystem},
    integrations::{BookingProvider, HttpBookingProvider},
};

// Export agentic core types
pub use agentic::{
    AgentContext, AgentExecutor, AgentRegistry, AgentReply, AgentTask, PlanAgent, PlanCoordinator,
    RouteRequest, RouteResponse,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const CORE_NAME: &str = "TripMesh Core";
