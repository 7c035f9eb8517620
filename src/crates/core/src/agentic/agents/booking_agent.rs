//! Booking agent: third-party search and confirmation.
//!
//! Search results always land in the `bookings` side channel. Confirmation
//! only happens when `auto_confirm` is set; otherwise the traveler gets the
//! option list to choose from.

use std::collections::BTreeMap;

use async_trait::async_trait;
use log::debug;
use tripmesh_core_types::{
    AgentCapabilities, ChangeOperation, ChangeScope, ChangeSet, CostEstimate, NodeDraft, NodeKind,
    TaskType,
};

use super::AGENT_KIND_BOOKING;
use crate::agentic::agent::{AgentContext, AgentReply, AgentTask, PlanAgent};
use crate::agentic::executor::ProgressReporter;
use crate::infrastructure::ai::parse_json_payload;
use crate::infrastructure::integrations::{BookingCriteria, BookingOption};
use crate::util::errors::TripMeshResult;
use crate::util::ids::new_changeset_id;

const DEFAULT_MAX_OPTIONS: usize = 5;

pub struct BookingAgent {
    config: BTreeMap<String, String>,
}

impl BookingAgent {
    pub fn new() -> Self {
        let mut config = BTreeMap::new();
        config.insert("auto_confirm".to_string(), "false".to_string());
        config.insert("max_options".to_string(), DEFAULT_MAX_OPTIONS.to_string());
        config.insert("payment_proof".to_string(), "payment-on-file".to_string());
        Self { config }
    }

    pub fn with_auto_confirm(auto_confirm: bool) -> Self {
        let mut agent = Self::new();
        agent
            .config
            .insert("auto_confirm".to_string(), auto_confirm.to_string());
        agent
    }

    fn auto_confirm(&self) -> bool {
        self.config
            .get("auto_confirm")
            .map(|v| v == "true")
            .unwrap_or(false)
    }

    fn max_options(&self) -> usize {
        self.config
            .get("max_options")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_OPTIONS)
    }

    fn payment_proof(&self) -> &str {
        self.config
            .get("payment_proof")
            .map(String::as_str)
            .unwrap_or("payment-on-file")
    }

    /// Criteria extraction is best-effort: unparseable model output falls
    /// back to a broad hotel search seeded from the request text.
    async fn extract_criteria(
        &self,
        ctx: &AgentContext,
        task: &AgentTask,
        summary: &str,
    ) -> TripMeshResult<BookingCriteria> {
        let prompt = format!(
            r#"Extract booking search criteria from this travel request.

Request:
{}

Output STRICT JSON ONLY:
{{"kind": "hotel|flight|restaurant|activity", "destination": "string", "dayNumber": 1, "budgetCents": 0, "notes": "string"}}

Omit dayNumber/budgetCents when the request does not mention them."#,
            task.request_text
        );

        let raw = ctx.generator.generate(&prompt, summary).await?;
        match parse_json_payload::<BookingCriteria>(&raw) {
            Ok(criteria) => Ok(criteria),
            Err(e) => {
                debug!("Criteria extraction fallback: error={}", e);
                let plan = ctx.plans.get_snapshot(&task.trip_id)?;
                Ok(BookingCriteria {
                    kind: "hotel".to_string(),
                    destination: plan.settings.origin.unwrap_or(plan.title),
                    day_number: None,
                    budget_cents: None,
                    notes: task.request_text.clone(),
                })
            }
        }
    }
}

impl Default for BookingAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlanAgent for BookingAgent {
    fn id(&self) -> &str {
        "booking"
    }

    fn kind(&self) -> &str {
        AGENT_KIND_BOOKING
    }

    fn capabilities(&self) -> AgentCapabilities {
        AgentCapabilities {
            task_types: vec![TaskType::Book],
            data_sections: vec!["bookings".to_string()],
            priority: 20,
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
        let summary = ctx.plans.summarize(&task.trip_id)?;

        progress.running(10, "criteria", "Extracting booking criteria").await;
        let criteria = self.extract_criteria(ctx, task, &summary).await?;

        progress
            .running(
                30,
                "search",
                &format!("Searching {} options in {}", criteria.kind, criteria.destination),
            )
            .await;
        let mut options = ctx.booking.search(&criteria).await?;
        options.truncate(self.max_options());

        if options.is_empty() {
            return Ok(AgentReply {
                text: format!(
                    "No {} options found for {}",
                    criteria.kind, criteria.destination
                ),
                new_version: None,
                diff: None,
                data: Some(serde_json::json!({ "options": [] })),
            });
        }

        let outcome = ctx
            .plans
            .put_side_data(
                &task.trip_id,
                "bookings",
                serde_json::json!({
                    "criteria": &criteria,
                    "options": &options,
                }),
                self.id(),
                task.user_id.clone(),
                "Record booking search results",
            )
            .await?;

        if !self.auto_confirm() {
            return Ok(AgentReply {
                text: format_option_list(&criteria, &options),
                new_version: Some(outcome.version),
                diff: Some(outcome.diff),
                data: Some(serde_json::json!({ "options": &options })),
            });
        }

        // Confirm the top option. Not idempotent, so no retry: a failure
        // surfaces with the search results already recorded.
        let best = &options[0];
        progress
            .running(70, "confirm", &format!("Confirming {}", best.name))
            .await;
        let confirmation = ctx
            .booking
            .confirm(&best.option_id, self.payment_proof())
            .await?;

        let day_number = criteria.day_number.unwrap_or(1);
        let changeset = ChangeSet {
            changeset_id: new_changeset_id(),
            name: format!("Book {}", best.name),
            scope: ChangeScope::Day { day_number },
            operations: vec![ChangeOperation::Insert {
                day: day_number,
                node: NodeDraft {
                    kind: NodeKind::Booking,
                    title: format!("{} (confirmed)", best.name),
                    time: None,
                    cost: Some(CostEstimate {
                        amount_cents: best.price_cents,
                        currency: best.currency.clone(),
                    }),
                    details: format!(
                        "Confirmation {} for option {}",
                        confirmation.confirmation_id, best.option_id
                    ),
                    locked: true,
                },
                position: None,
            }],
            reason: task.intent.clone(),
            agent_id: self.id().to_string(),
            user_id: task.user_id.clone(),
        };
        let outcome = ctx.plans.apply_changeset(&task.trip_id, changeset).await?;

        Ok(AgentReply {
            text: format!(
                "Booked {} ({}), confirmation {} (version {})",
                best.name, criteria.kind, confirmation.confirmation_id, outcome.version
            ),
            new_version: Some(outcome.version),
            diff: Some(outcome.diff),
            data: Some(serde_json::json!({ "confirmation": confirmation })),
        })
    }
}

fn format_option_list(criteria: &BookingCriteria, options: &[BookingOption]) -> String {
    let mut text = format!(
        "Found {} {} options for {}:\n",
        options.len(),
        criteria.kind,
        criteria.destination
    );
    for opt in options {
        text.push_str(&format!(
            "- {} ({}.{:02} {})\n",
            opt.name,
            opt.price_cents / 100,
            (opt.price_cents % 100).abs(),
            opt.currency
        ));
    }
    text.push_str("Reply with the one to confirm.");
    text
}
