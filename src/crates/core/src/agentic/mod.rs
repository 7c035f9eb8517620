//! Agentic layer - agent contract, registry, execution, orchestration.

pub mod agent;
pub mod agents;
pub mod coordinator;
pub mod executor;
pub mod registry;

pub use agent::{AgentContext, AgentReply, AgentTask, PlanAgent};
pub use agents::register_default_agents;
pub use coordinator::{AgentAttemptError, PlanCoordinator, RouteRequest, RouteResponse};
pub use executor::{AgentExecutor, ProgressReporter};
pub use registry::{AgentDescriptor, AgentRegistry};
