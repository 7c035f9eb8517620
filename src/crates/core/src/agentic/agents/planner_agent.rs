//! Itinerary planner: day-batched full-plan generation.
//!
//! Generates one day per model call so progress streams incrementally and
//! cancellation can land between batches. Each day's operations commit as
//! their own change set; an unapplied batch is discarded, never partially
//! committed.

use std::collections::BTreeMap;

use async_trait::async_trait;
use log::debug;
use tripmesh_core_types::{AgentCapabilities, ChangeScope, ChangeSet, TaskType};

use super::drafts::{parse_change_draft, ChangeDraft, OPERATIONS_SCHEMA};
use super::AGENT_KIND_PLANNER;
use crate::agentic::agent::{AgentContext, AgentReply, AgentTask, PlanAgent};
use crate::agentic::executor::ProgressReporter;
use crate::util::errors::{TripMeshError, TripMeshResult};
use crate::util::ids::new_changeset_id;

const DEFAULT_MAX_DAYS: usize = 14;

pub struct ItineraryPlannerAgent {
    config: BTreeMap<String, String>,
}

impl ItineraryPlannerAgent {
    pub fn new() -> Self {
        let mut config = BTreeMap::new();
        config.insert("max_days".to_string(), DEFAULT_MAX_DAYS.to_string());
        Self { config }
    }

    fn max_days(&self) -> usize {
        self.config
            .get("max_days")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_DAYS)
    }

    async fn generate_day_draft(
        &self,
        ctx: &AgentContext,
        task: &AgentTask,
        progress: &ProgressReporter,
        day_number: u32,
        total_days: usize,
    ) -> TripMeshResult<ChangeDraft> {
        // Re-summarize before each batch so later days see committed
        // earlier days.
        let summary = ctx.plans.summarize(&task.trip_id)?;
        let prompt = build_day_prompt(&task.request_text, &task.intent, day_number, total_days);

        let raw = ctx.generator.generate(&prompt, &summary).await?;
        match parse_change_draft(&raw) {
            Ok(draft) => Ok(draft),
            Err(parse_err) => {
                // Recoverable: one corrective regeneration before surfacing.
                progress
                    .running(
                        day_progress(day_number, total_days),
                        &format!("day {}", day_number),
                        "Repairing malformed generation output",
                    )
                    .await;
                let corrective = format!(
                    "{}\n\nYour previous reply could not be parsed ({}). Return STRICT JSON only.",
                    prompt, parse_err
                );
                let raw = ctx.generator.generate(&corrective, &summary).await?;
                parse_change_draft(&raw)
            }
        }
    }
}

impl Default for ItineraryPlannerAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlanAgent for ItineraryPlannerAgent {
    fn id(&self) -> &str {
        "itinerary-planner"
    }

    fn kind(&self) -> &str {
        AGENT_KIND_PLANNER
    }

    fn capabilities(&self) -> AgentCapabilities {
        AgentCapabilities {
            task_types: vec![TaskType::Plan],
            data_sections: vec!["planning".to_string()],
            priority: 10,
            enabled: true,
            chat_eligible: true,
            config: self.config.clone(),
        }
    }

    async fn execute(
        &self,
        ctx: &AgentContext,
        task: &AgentTask,
        progress: &ProgressReporter,
    ) -> TripMeshResult<AgentReply> {
        let plan = ctx.plans.get_snapshot(&task.trip_id)?;
        let total_days = plan.days.len();
        if total_days > self.max_days() {
            return Err(TripMeshError::Validation(format!(
                "Plan has {} days; planner is limited to {} (config max_days)",
                total_days,
                self.max_days()
            )));
        }

        progress
            .running(5, "outline", &format!("Planning {} days", total_days))
            .await;

        let mut last_version = plan.version;
        let mut nodes_touched = 0usize;
        let mut last_diff = None;

        for day in &plan.days {
            // Cooperative cancellation lands between batches only; the
            // day batches already committed stay committed.
            if task.cancel.is_cancelled() {
                return Err(TripMeshError::Cancelled(format!(
                    "plan generation cancelled before day {}",
                    day.day_number
                )));
            }

            let draft = self
                .generate_day_draft(ctx, task, progress, day.day_number, total_days)
                .await?;

            let changeset = ChangeSet {
                changeset_id: new_changeset_id(),
                name: if draft.name.is_empty() {
                    format!("Generate day {}", day.day_number)
                } else {
                    draft.name
                },
                scope: ChangeScope::Day {
                    day_number: day.day_number,
                },
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
            nodes_touched += outcome.diff.touched_nodes();
            last_version = outcome.version;
            last_diff = Some(outcome.diff);

            debug!(
                "Planner committed day: trip_id={}, day={}, version={}",
                task.trip_id, day.day_number, last_version
            );
            progress
                .running(
                    day_progress(day.day_number, total_days),
                    &format!("day {}", day.day_number),
                    &format!("Day {} of {} planned", day.day_number, total_days),
                )
                .await;
        }

        Ok(AgentReply {
            text: format!(
                "Planned {} days with {} itinerary items (version {})",
                total_days, nodes_touched, last_version
            ),
            new_version: Some(last_version),
            diff: last_diff,
            data: Some(serde_json::json!({ "daysPlanned": total_days })),
        })
    }
}

fn day_progress(day_number: u32, total_days: usize) -> u8 {
    let total = total_days.max(1) as u64;
    (5 + (90 * day_number as u64) / total).min(95) as u8
}

fn build_day_prompt(request: &str, intent: &str, day_number: u32, total_days: usize) -> String {
    format!(
        r#"You are the itinerary planner filling in day {day_number} of a {total_days}-day trip.

Traveler request:
{request}

Interpreted intent:
{intent}

Plan ONLY day {day_number}: 3-6 items covering morning to evening, using insert operations targeting day {day_number}. Keep times non-overlapping and costs realistic.

{schema}"#,
        day_number = day_number,
        total_days = total_days,
        request = request,
        intent = intent,
        schema = OPERATIONS_SCHEMA,
    )
}
