//! Built-in agent set.
//!
//! A closed, typed set of agent variants behind the `PlanAgent` interface.
//! Selection always goes through the registry's capability map.

pub mod audit_agent;
pub mod booking_agent;
pub mod chat_agent;
pub mod drafts;
pub mod editor_agent;
pub mod planner_agent;

pub use audit_agent::{AuditFinding, PlanAuditAgent};
pub use booking_agent::BookingAgent;
pub use chat_agent::ConciergeChatAgent;
pub use drafts::{parse_change_draft, ChangeDraft};
pub use editor_agent::ItineraryEditorAgent;
pub use planner_agent::ItineraryPlannerAgent;

use std::sync::Arc;

use crate::agentic::agent::PlanAgent;
use crate::agentic::registry::AgentRegistry;
use crate::util::errors::TripMeshResult;

pub const AGENT_KIND_PLANNER: &str = "planner";
pub const AGENT_KIND_EDITOR: &str = "editor";
pub const AGENT_KIND_BOOKING: &str = "booking";
pub const AGENT_KIND_CHAT: &str = "chat";
pub const AGENT_KIND_AUDIT: &str = "audit";

/// Registers the built-in roster. Fails on the first conflict, which only
/// happens if a custom agent already claimed one of the built-in task
/// types.
pub async fn register_default_agents(registry: &AgentRegistry) -> TripMeshResult<()> {
    let agents: Vec<Arc<dyn PlanAgent>> = vec![
        Arc::new(ItineraryPlannerAgent::new()),
        Arc::new(ItineraryEditorAgent::new()),
        Arc::new(BookingAgent::new()),
        Arc::new(ConciergeChatAgent::new()),
        Arc::new(PlanAuditAgent::new()),
    ];
    for agent in agents {
        registry.register(agent).await?;
    }
    Ok(())
}
