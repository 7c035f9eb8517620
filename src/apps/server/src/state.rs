//! Shared handler state.

use std::sync::Arc;

use tripmesh_core::agentic::registry::AgentRegistry;
use tripmesh_core::infrastructure::events::BackendEventSystem;
use tripmesh_core::service::plan::PlanService;
use tripmesh_core::PlanCoordinator;

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<PlanCoordinator>,
    pub plans: Arc<PlanService>,
    pub events: Arc<BackendEventSystem>,
    pub registry: Arc<AgentRegistry>,
}
