//! Concierge chat: answers questions over the plan, never mutates it.

use async_trait::async_trait;
use tripmesh_core_types::{AgentCapabilities, TaskType};

use super::AGENT_KIND_CHAT;
use crate::agentic::agent::{AgentContext, AgentReply, AgentTask, PlanAgent};
use crate::agentic::executor::ProgressReporter;
use crate::util::errors::TripMeshResult;

pub struct ConciergeChatAgent;

impl ConciergeChatAgent {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConciergeChatAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlanAgent for ConciergeChatAgent {
    fn id(&self) -> &str {
        "concierge-chat"
    }

    fn kind(&self) -> &str {
        AGENT_KIND_CHAT
    }

    fn capabilities(&self) -> AgentCapabilities {
        AgentCapabilities {
            task_types: vec![TaskType::Chat],
            data_sections: Vec::new(),
            priority: 30,
            enabled: true,
            chat_eligible: true,
            config: Default::default(),
        }
    }

    async fn execute(
        &self,
        ctx: &AgentContext,
        task: &AgentTask,
        progress: &ProgressReporter,
    ) -> TripMeshResult<AgentReply> {
        let summary = ctx.plans.summarize(&task.trip_id)?;
        progress.running(30, "compose", "Composing answer").await;

        let prompt = format!(
            "Answer the traveler's question using only the plan summary provided as context. \
             Be concise and concrete; mention days and item titles rather than internal ids.\n\n\
             Question:\n{}",
            task.request_text
        );
        let text = ctx.generator.generate(&prompt, &summary).await?;

        Ok(AgentReply {
            text,
            new_version: None,
            diff: None,
            data: None,
        })
    }
}
