//! Capability registry.
//!
//! Owns the mutable enabled/disabled state and enforces the single-owner
//! rule: across all *enabled* registrations, every task type belongs to at
//! most one agent. Registration is all-or-nothing; enabling re-checks
//! conflicts because ownership may have moved while an agent was disabled.

use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tripmesh_core_types::{AgentCapabilities, TaskType};

use crate::agentic::agent::PlanAgent;
use crate::util::errors::{TripMeshError, TripMeshResult};

struct Registration {
    agent: Arc<dyn PlanAgent>,
    capabilities: AgentCapabilities,
    enabled: bool,
    order: usize,
}

/// Snapshot of one registration for observers (the admin API).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDescriptor {
    pub agent_id: String,
    pub kind: String,
    pub enabled: bool,
    pub capabilities: AgentCapabilities,
}

pub struct AgentRegistry {
    inner: RwLock<Vec<Registration>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Vec::new()),
        }
    }

    /// Registers an agent with its declared capabilities. Fails with
    /// `CapabilityConflict` when any declared task type already belongs to
    /// another enabled agent; nothing is registered in that case.
    pub async fn register(&self, agent: Arc<dyn PlanAgent>) -> TripMeshResult<()> {
        let capabilities = agent.capabilities();
        let mut inner = self.inner.write().await;

        if inner.iter().any(|r| r.agent.id() == agent.id()) {
            return Err(TripMeshError::Validation(format!(
                "Agent already registered: {}",
                agent.id()
            )));
        }

        if capabilities.enabled {
            check_conflicts(&inner, agent.id(), &capabilities.task_types)?;
        }

        debug!(
            "Registering agent: agent_id={}, tasks={:?}, priority={}",
            agent.id(),
            capabilities.task_types,
            capabilities.priority
        );
        let order = inner.len();
        inner.push(Registration {
            enabled: capabilities.enabled,
            capabilities,
            agent,
            order,
        });
        Ok(())
    }

    /// Re-enables a declaration. Conflict-checked: another agent may have
    /// taken over a task type while this one was disabled.
    pub async fn enable(&self, agent_id: &str) -> TripMeshResult<()> {
        let mut inner = self.inner.write().await;
        let idx = position_of(&inner, agent_id)?;
        if !inner[idx].enabled {
            let task_types = inner[idx].capabilities.task_types.clone();
            check_conflicts(&inner, agent_id, &task_types)?;
            inner[idx].enabled = true;
        }
        Ok(())
    }

    /// Removes the agent from resolution without dropping its declaration.
    pub async fn disable(&self, agent_id: &str) -> TripMeshResult<()> {
        let mut inner = self.inner.write().await;
        let idx = position_of(&inner, agent_id)?;
        inner[idx].enabled = false;
        Ok(())
    }

    /// Enabled agents handling `task_type`, ordered by ascending priority
    /// then registration order. `chat_only` filters to chat-eligible
    /// agents. An empty result is a normal outcome, never an error.
    pub async fn resolve(&self, task_type: TaskType, chat_only: bool) -> Vec<Arc<dyn PlanAgent>> {
        let inner = self.inner.read().await;
        let mut hits: Vec<&Registration> = inner
            .iter()
            .filter(|r| {
                r.enabled
                    && r.capabilities.supports(task_type)
                    && (!chat_only || r.capabilities.chat_eligible)
            })
            .collect();
        hits.sort_by_key(|r| (r.capabilities.priority, r.order));
        hits.into_iter().map(|r| r.agent.clone()).collect()
    }

    pub async fn get(&self, agent_id: &str) -> Option<Arc<dyn PlanAgent>> {
        let inner = self.inner.read().await;
        inner
            .iter()
            .find(|r| r.agent.id() == agent_id)
            .map(|r| r.agent.clone())
    }

    pub async fn list(&self) -> Vec<AgentDescriptor> {
        let inner = self.inner.read().await;
        inner
            .iter()
            .map(|r| AgentDescriptor {
                agent_id: r.agent.id().to_string(),
                kind: r.agent.kind().to_string(),
                enabled: r.enabled,
                capabilities: r.capabilities.clone(),
            })
            .collect()
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn position_of(registrations: &[Registration], agent_id: &str) -> TripMeshResult<usize> {
    registrations
        .iter()
        .position(|r| r.agent.id() == agent_id)
        .ok_or_else(|| TripMeshError::NotFound(format!("Agent not registered: {}", agent_id)))
}

fn check_conflicts(
    registrations: &[Registration],
    agent_id: &str,
    task_types: &[TaskType],
) -> TripMeshResult<()> {
    for task in task_types {
        if let Some(owner) = registrations
            .iter()
            .find(|r| r.enabled && r.agent.id() != agent_id && r.capabilities.supports(*task))
        {
            return Err(TripMeshError::CapabilityConflict(format!(
                "task type '{}' already owned by enabled agent '{}'",
                task.as_str(),
                owner.agent.id()
            )));
        }
    }
    Ok(())
}
