//! Agent contract: one task-specific body behind a uniform interface.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tripmesh_core_types::{AgentCapabilities, PlanDiff, TaskType};

use crate::agentic::executor::ProgressReporter;
use crate::infrastructure::ai::{ContentGenerator, IntentClassifier};
use crate::infrastructure::events::BackendEventSystem;
use crate::infrastructure::integrations::BookingProvider;
use crate::service::plan::PlanService;
use crate::util::errors::TripMeshResult;

/// Shared handles every agent body gets. External capabilities are trait
/// objects so tests can script them.
pub struct AgentContext {
    pub plans: Arc<PlanService>,
    pub classifier: Arc<dyn IntentClassifier>,
    pub generator: Arc<dyn ContentGenerator>,
    pub booking: Arc<dyn BookingProvider>,
    pub events: Arc<BackendEventSystem>,
}

/// One routed unit of work.
#[derive(Clone)]
pub struct AgentTask {
    pub trip_id: String,
    pub task_type: TaskType,
    /// Classifier's restatement of the request.
    pub intent: String,
    /// Original user text.
    pub request_text: String,
    pub user_id: Option<String>,
    /// Cooperative cancellation between generation steps; never observed
    /// mid-apply.
    pub cancel: CancellationToken,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentReply {
    pub text: String,
    #[serde(default)]
    pub new_version: Option<u64>,
    #[serde(default)]
    pub diff: Option<PlanDiff>,
    /// Agent-specific structured payload (booking options, audit findings).
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// Implemented by each concrete agent. The execution contract wrapper in
/// `executor` owns lifecycle events and failure translation; bodies only
/// do their task.
#[async_trait]
pub trait PlanAgent: Send + Sync {
    fn id(&self) -> &str;

    /// Kind label carried on progress events ("planner", "editor"...).
    fn kind(&self) -> &str;

    /// Static capability declaration. The registry enforces task-type
    /// disjointness across enabled agents.
    fn capabilities(&self) -> AgentCapabilities;

    fn can_handle(&self, task_type: TaskType) -> bool {
        self.capabilities().supports(task_type)
    }

    async fn execute(
        &self,
        ctx: &AgentContext,
        task: &AgentTask,
        progress: &ProgressReporter,
    ) -> TripMeshResult<AgentReply>;
}
