//! Typed agent progress events published to transport sinks.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl AgentStatus {
    /// Terminal statuses are emitted exactly once per agent execution.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// One progress/status sample from an agent execution. Emitted 1..N times;
/// the terminal status arrives exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentEvent {
    pub agent_id: String,
    /// Agent kind label shown to observers ("planner", "editor"...).
    pub agent_kind: String,
    pub status: AgentStatus,
    /// 0-100.
    pub progress: u8,
    #[serde(default)]
    pub message: String,
    /// Coarse phase label ("classify", "generate day 2", "confirm"...).
    #[serde(default)]
    pub stage: String,
    pub timestamp_ms: i64,
    pub trip_id: String,
}

impl AgentEvent {
    pub fn clamped_progress(&self) -> u8 {
        self.progress.min(100)
    }
}
