//! Agent execution contract.
//!
//! Wraps every agent invocation with responsibility validation, lifecycle
//! event emission, and uniform failure translation. The terminal event is
//! never skipped: bodies run in a spawned task so error returns and panics
//! both end in exactly one `completed`/`failed`.

use std::sync::Arc;

use log::warn;
use tripmesh_core_types::{AgentEvent, AgentStatus};

use crate::agentic::agent::{AgentContext, AgentReply, AgentTask, PlanAgent};
use crate::infrastructure::events::BackendEventSystem;
use crate::util::errors::{TripMeshError, TripMeshResult};
use crate::util::ids::now_ms;

/// Handle agents use to publish incremental `running` events.
#[derive(Clone)]
pub struct ProgressReporter {
    events: Arc<BackendEventSystem>,
    agent_id: String,
    agent_kind: String,
    trip_id: String,
}

impl ProgressReporter {
    fn new(
        events: Arc<BackendEventSystem>,
        agent_id: String,
        agent_kind: String,
        trip_id: String,
    ) -> Self {
        Self {
            events,
            agent_id,
            agent_kind,
            trip_id,
        }
    }

    pub async fn running(&self, progress: u8, stage: &str, message: &str) {
        self.emit(AgentStatus::Running, progress, stage, message).await;
    }

    async fn emit(&self, status: AgentStatus, progress: u8, stage: &str, message: &str) {
        self.events
            .emit(AgentEvent {
                agent_id: self.agent_id.clone(),
                agent_kind: self.agent_kind.clone(),
                status,
                progress: progress.min(100),
                message: message.to_string(),
                stage: stage.to_string(),
                timestamp_ms: now_ms(),
                trip_id: self.trip_id.clone(),
            })
            .await;
    }
}

pub struct AgentExecutor {
    events: Arc<BackendEventSystem>,
}

impl AgentExecutor {
    pub fn new(events: Arc<BackendEventSystem>) -> Self {
        Self { events }
    }

    /// Runs one agent under the contract: validate, `queued`, body,
    /// exactly one terminal event, error returned for fallback.
    pub async fn run(
        &self,
        agent: Arc<dyn PlanAgent>,
        ctx: Arc<AgentContext>,
        task: AgentTask,
    ) -> TripMeshResult<AgentReply> {
        // Responsibility validation precedes the lifecycle: a misrouted
        // invocation fails fast without starting an execution.
        if !agent.can_handle(task.task_type) {
            return Err(TripMeshError::UnsupportedTask(format!(
                "agent '{}' does not declare task type '{}'",
                agent.id(),
                task.task_type.as_str()
            )));
        }

        let reporter = ProgressReporter::new(
            self.events.clone(),
            agent.id().to_string(),
            agent.kind().to_string(),
            task.trip_id.clone(),
        );
        reporter
            .emit(AgentStatus::Queued, 0, "queued", &task.intent)
            .await;

        let body_reporter = reporter.clone();
        let body_agent = agent.clone();
        let handle = tokio::spawn(async move {
            body_agent.execute(&ctx, &task, &body_reporter).await
        });

        match handle.await {
            Ok(Ok(reply)) => {
                reporter
                    .emit(
                        AgentStatus::Completed,
                        100,
                        "done",
                        &truncate(&reply.text, 300),
                    )
                    .await;
                Ok(reply)
            }
            Ok(Err(e)) => {
                warn!("Agent failed: agent_id={}, error={}", agent.id(), e);
                reporter
                    .emit(AgentStatus::Failed, 0, "failed", &e.to_string())
                    .await;
                Err(e)
            }
            Err(join_err) => {
                let message = if join_err.is_panic() {
                    format!("agent panicked: {}", panic_message(join_err.into_panic()))
                } else {
                    "agent task aborted".to_string()
                };
                warn!("Agent crashed: agent_id={}, error={}", agent.id(), message);
                reporter
                    .emit(AgentStatus::Failed, 0, "failed", &message)
                    .await;
                Err(TripMeshError::Internal(message))
            }
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
