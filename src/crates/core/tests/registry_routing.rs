//! Capability registry: single-owner enforcement, enable/disable, resolve
//! ordering.

use std::sync::Arc;

use async_trait::async_trait;

use tripmesh_core::agentic::agents::{ItineraryEditorAgent, ItineraryPlannerAgent, PlanAuditAgent};
use tripmesh_core::agentic::{AgentContext, AgentRegistry, AgentReply, AgentTask, PlanAgent};
use tripmesh_core::agentic::executor::ProgressReporter;
use tripmesh_core::{TripMeshError, TripMeshResult};
use tripmesh_core_types::{AgentCapabilities, TaskType};

/// Minimal configurable agent for registry scenarios.
struct StubAgent {
    id: String,
    capabilities: AgentCapabilities,
}

impl StubAgent {
    fn new(id: &str, task_types: Vec<TaskType>, priority: u8, chat_eligible: bool) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            capabilities: AgentCapabilities {
                task_types,
                data_sections: Vec::new(),
                priority,
                enabled: true,
                chat_eligible,
                config: Default::default(),
            },
        })
    }
}

#[async_trait]
impl PlanAgent for StubAgent {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &str {
        "stub"
    }

    fn capabilities(&self) -> AgentCapabilities {
        self.capabilities.clone()
    }

    async fn execute(
        &self,
        _ctx: &AgentContext,
        _task: &AgentTask,
        _progress: &ProgressReporter,
    ) -> TripMeshResult<AgentReply> {
        Ok(AgentReply::default())
    }
}

#[tokio::test]
async fn overlapping_task_types_are_rejected_at_registration() {
    let registry = AgentRegistry::new();
    registry
        .register(StubAgent::new("planner", vec![TaskType::Plan], 10, true))
        .await
        .expect("first registration");

    let err = registry
        .register(StubAgent::new(
            "rival",
            vec![TaskType::Edit, TaskType::Plan],
            5,
            true,
        ))
        .await
        .expect_err("conflict");
    assert!(matches!(err, TripMeshError::CapabilityConflict(_)));

    // All-or-nothing: the rival's non-conflicting task type was not
    // registered either.
    assert!(registry.resolve(TaskType::Edit, true).await.is_empty());
}

#[tokio::test]
async fn resolve_scenario_from_two_agent_roster() {
    let registry = AgentRegistry::new();
    registry
        .register(StubAgent::new("planner", vec![TaskType::Plan], 10, true))
        .await
        .expect("planner");
    registry
        .register(StubAgent::new("editor", vec![TaskType::Edit], 10, true))
        .await
        .expect("editor");

    let hits = registry.resolve(TaskType::Edit, true).await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id(), "editor");

    // Unowned task type resolves to empty, not an error.
    assert!(registry.resolve(TaskType::Book, true).await.is_empty());
}

#[tokio::test]
async fn chat_only_filters_pipeline_agents() {
    let registry = AgentRegistry::new();
    registry
        .register(Arc::new(PlanAuditAgent::new()))
        .await
        .expect("audit");

    assert!(registry.resolve(TaskType::Audit, true).await.is_empty());
    assert_eq!(registry.resolve(TaskType::Audit, false).await.len(), 1);
}

#[tokio::test]
async fn disable_frees_the_task_type_and_enable_rechecks() {
    let registry = AgentRegistry::new();
    registry
        .register(Arc::new(ItineraryPlannerAgent::new()))
        .await
        .expect("planner");

    registry.disable("itinerary-planner").await.expect("disable");
    assert!(registry.resolve(TaskType::Plan, true).await.is_empty());

    // A disabled declaration no longer blocks registration.
    registry
        .register(StubAgent::new("planner-2", vec![TaskType::Plan], 5, true))
        .await
        .expect("takeover");

    // Re-enabling the original now conflicts with the new owner.
    let err = registry.enable("itinerary-planner").await.expect_err("conflict");
    assert!(matches!(err, TripMeshError::CapabilityConflict(_)));

    // Dropping the new owner unblocks the re-enable.
    registry.disable("planner-2").await.expect("disable takeover");
    registry.enable("itinerary-planner").await.expect("enable");
    let hits = registry.resolve(TaskType::Plan, true).await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id(), "itinerary-planner");
}

#[tokio::test]
async fn resolve_skips_disabled_claimants() {
    let registry = AgentRegistry::new();
    registry
        .register(StubAgent::new("chat-low", vec![TaskType::Chat], 30, true))
        .await
        .expect("chat-low");
    registry.disable("chat-low").await.expect("disable");
    registry
        .register(StubAgent::new("chat-high", vec![TaskType::Chat], 5, true))
        .await
        .expect("chat-high");

    let hits = registry.resolve(TaskType::Chat, true).await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id(), "chat-high");

    let descriptors = registry.list().await;
    assert_eq!(descriptors.len(), 2);
    assert!(descriptors.iter().any(|d| d.agent_id == "chat-low" && !d.enabled));
}

#[tokio::test]
async fn duplicate_agent_ids_are_rejected() {
    let registry = AgentRegistry::new();
    registry
        .register(Arc::new(ItineraryEditorAgent::new()))
        .await
        .expect("editor");
    let err = registry
        .register(Arc::new(ItineraryEditorAgent::new()))
        .await
        .expect_err("duplicate");
    assert!(matches!(err, TripMeshError::Validation(_)));
}
