//! Request orchestrator.
//!
//! Classifies free text into a task type, resolves candidates through the
//! registry, and executes them in priority order with fallback. `route`
//! never returns an error: every outcome is a response object, failed
//! attempts embedded in it.

use std::sync::Arc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tripmesh_core_types::TaskType;

use crate::agentic::agent::{AgentContext, AgentReply, AgentTask};
use crate::agentic::executor::AgentExecutor;
use crate::agentic::registry::AgentRegistry;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    pub trip_id: String,
    pub text: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentAttemptError {
    pub agent_id: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub task_type: Option<TaskType>,
    #[serde(default)]
    pub confidence: Option<f32>,
    /// Agent that produced the successful reply.
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub reply: Option<AgentReply>,
    /// Errors from candidates attempted before the outcome, in attempt
    /// order.
    #[serde(default)]
    pub errors: Vec<AgentAttemptError>,
}

impl RouteResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            ..Default::default()
        }
    }
}

pub struct PlanCoordinator {
    registry: Arc<AgentRegistry>,
    executor: AgentExecutor,
    ctx: Arc<AgentContext>,
}

impl PlanCoordinator {
    pub fn new(registry: Arc<AgentRegistry>, ctx: Arc<AgentContext>) -> Self {
        let executor = AgentExecutor::new(ctx.events.clone());
        Self {
            registry,
            executor,
            ctx,
        }
    }

    pub fn registry(&self) -> Arc<AgentRegistry> {
        self.registry.clone()
    }

    pub fn context(&self) -> Arc<AgentContext> {
        self.ctx.clone()
    }

    /// Routes one interactive request end to end.
    pub async fn route(&self, req: RouteRequest) -> RouteResponse {
        let summary = match self.ctx.plans.summarize(&req.trip_id) {
            Ok(s) => s,
            Err(e) => return RouteResponse::failure(e.to_string()),
        };

        let classification = match self.ctx.classifier.classify(&req.text, &summary).await {
            Ok(c) => c,
            Err(e) => {
                warn!("Classification failed: trip_id={}, error={}", req.trip_id, e);
                return RouteResponse::failure(format!("Classification failed: {}", e));
            }
        };
        debug!(
            "Request classified: trip_id={}, task_type={}, confidence={}",
            req.trip_id,
            classification.task_type.as_str(),
            classification.confidence
        );

        let mut response = self
            .dispatch(
                classification.task_type,
                true,
                &req.trip_id,
                &classification.intent,
                &req.text,
                req.user_id.clone(),
            )
            .await;
        response.intent = Some(classification.intent);
        response.task_type = Some(classification.task_type);
        response.confidence = Some(classification.confidence);
        response
    }

    /// Runs a task type directly, bypassing classification. Pipeline
    /// entry point for non-chat task types (e.g. audits).
    pub async fn run_task(
        &self,
        task_type: TaskType,
        trip_id: &str,
        instruction: &str,
        user_id: Option<String>,
    ) -> RouteResponse {
        let mut response = self
            .dispatch(task_type, false, trip_id, instruction, instruction, user_id)
            .await;
        response.task_type = Some(task_type);
        response
    }

    async fn dispatch(
        &self,
        task_type: TaskType,
        chat_only: bool,
        trip_id: &str,
        intent: &str,
        request_text: &str,
        user_id: Option<String>,
    ) -> RouteResponse {
        let candidates = self.registry.resolve(task_type, chat_only).await;
        if candidates.is_empty() {
            return RouteResponse::failure(format!(
                "No suitable agent for task type '{}'",
                task_type.as_str()
            ));
        }

        let mut errors: Vec<AgentAttemptError> = Vec::new();
        for agent in candidates {
            let task = AgentTask {
                trip_id: trip_id.to_string(),
                task_type,
                intent: intent.to_string(),
                request_text: request_text.to_string(),
                user_id: user_id.clone(),
                cancel: CancellationToken::new(),
            };

            match self.executor.run(agent.clone(), self.ctx.clone(), task).await {
                Ok(reply) => {
                    return RouteResponse {
                        success: true,
                        message: "ok".to_string(),
                        intent: None,
                        task_type: None,
                        confidence: None,
                        agent_id: Some(agent.id().to_string()),
                        reply: Some(reply),
                        errors,
                    };
                }
                Err(e) => {
                    warn!(
                        "Candidate agent failed, trying next: agent_id={}, error={}",
                        agent.id(),
                        e
                    );
                    errors.push(AgentAttemptError {
                        agent_id: agent.id().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        RouteResponse {
            success: false,
            message: "All candidate agents failed".to_string(),
            errors,
            ..Default::default()
        }
    }
}
