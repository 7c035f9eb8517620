//! Itinerary editor: targeted single-shot mutations.

use async_trait::async_trait;
use tripmesh_core_types::{AgentCapabilities, ChangeScope, ChangeSet, TaskType};

use super::drafts::{parse_change_draft, OPERATIONS_SCHEMA};
use super::AGENT_KIND_EDITOR;
use crate::agentic::agent::{AgentContext, AgentReply, AgentTask, PlanAgent};
use crate::agentic::executor::ProgressReporter;
use crate::util::errors::TripMeshResult;
use crate::util::ids::new_changeset_id;

pub struct ItineraryEditorAgent;

impl ItineraryEditorAgent {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ItineraryEditorAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlanAgent for ItineraryEditorAgent {
    fn id(&self) -> &str {
        "itinerary-editor"
    }

    fn kind(&self) -> &str {
        AGENT_KIND_EDITOR
    }

    fn capabilities(&self) -> AgentCapabilities {
        AgentCapabilities {
            task_types: vec![TaskType::Edit],
            data_sections: Vec::new(),
            priority: 10,
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
        let prompt = build_edit_prompt(&task.request_text, &task.intent);

        progress.running(20, "generate", "Drafting edit operations").await;
        let raw = ctx.generator.generate(&prompt, &summary).await?;
        let draft = match parse_change_draft(&raw) {
            Ok(d) => d,
            Err(parse_err) => {
                progress
                    .running(40, "repair", "Repairing malformed edit output")
                    .await;
                let corrective = format!(
                    "{}\n\nYour previous reply could not be parsed ({}). Return STRICT JSON only.",
                    prompt, parse_err
                );
                let raw = ctx.generator.generate(&corrective, &summary).await?;
                parse_change_draft(&raw)?
            }
        };

        progress
            .running(
                70,
                "apply",
                &format!("Applying {} operations", draft.operations.len()),
            )
            .await;
        let changeset = ChangeSet {
            changeset_id: new_changeset_id(),
            name: if draft.name.is_empty() {
                "Edit itinerary".to_string()
            } else {
                draft.name
            },
            scope: ChangeScope::TripWide,
            operations: draft.operations,
            reason: if draft.reason.is_empty() {
                task.intent.clone()
            } else {
                draft.reason
            },
            agent_id: self.id().to_string(),
            user_id: task.user_id.clone(),
        };
        let outcome = ctx.plans.apply_changeset(&task.trip_id, changeset).await?;

        let mut added = 0;
        let mut removed = 0;
        let mut modified = 0;
        for day in outcome.diff.days.values() {
            added += day.added.len();
            removed += day.removed.len();
            modified += day.modified.len();
        }

        Ok(AgentReply {
            text: format!(
                "Applied edit: {} added, {} modified, {} removed (version {})",
                added, modified, removed, outcome.version
            ),
            new_version: Some(outcome.version),
            diff: Some(outcome.diff),
            data: None,
        })
    }
}

fn build_edit_prompt(request: &str, intent: &str) -> String {
    format!(
        r#"You are the itinerary editor. Apply the traveler's requested change to the existing plan.

Traveler request:
{request}

Interpreted intent:
{intent}

Produce the smallest set of operations that fulfills the request. Reference existing nodes by the ids shown in the plan summary.

{schema}"#,
        request = request,
        intent = intent,
        schema = OPERATIONS_SCHEMA,
    )
}
