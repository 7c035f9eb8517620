//! Agent capability declarations.
//!
//! Task ownership is exclusive: across all enabled agents, each task type
//! belongs to at most one declaration. The registry enforces this at
//! registration time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Closed set of routable task types. Agent dispatch goes through the
/// registry's map over these values, never runtime type inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// Generate or regenerate a multi-day itinerary.
    Plan,
    /// Targeted edits to existing nodes.
    Edit,
    /// Third-party search and booking confirmation.
    Book,
    /// Conversational Q&A over the plan, no mutation.
    Chat,
    /// Pipeline-only consistency sweep; unreachable from chat routing.
    Audit,
}

impl TaskType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plan => "plan",
            Self::Edit => "edit",
            Self::Book => "book",
            Self::Chat => "chat",
            Self::Audit => "audit",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "plan" => Some(Self::Plan),
            "edit" => Some(Self::Edit),
            "book" => Some(Self::Book),
            "chat" => Some(Self::Chat),
            "audit" => Some(Self::Audit),
            _ => None,
        }
    }
}

/// Static capability declaration, one per registered agent.
///
/// Recognized `config` keys are documented per agent (e.g. the planner's
/// `max_days`, the booking agent's `auto_confirm`). Unrecognized keys are
/// ignored, not errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCapabilities {
    /// Task types this agent owns. Disjoint across all enabled agents.
    pub task_types: Vec<TaskType>,
    /// Plan side-channel sections (`agent_data` keys) this agent may write.
    #[serde(default)]
    pub data_sections: Vec<String>,
    /// Lower value wins when several agents could take a task.
    pub priority: u8,
    /// Runtime toggle; disabling keeps the declaration but removes the
    /// agent from resolution (and from conflict checks).
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Whether interactive chat routing may select this agent.
    pub chat_eligible: bool,
    #[serde(default)]
    pub config: BTreeMap<String, String>,
}

fn default_enabled() -> bool {
    true
}

impl AgentCapabilities {
    pub fn supports(&self, task: TaskType) -> bool {
        self.task_types.contains(&task)
    }
}
