//! Plan audit: deterministic consistency sweep.
//!
//! Pipeline-only (not chat-eligible): interactive routing can never reach
//! it. Findings land in the `audit` side channel as a versioned commit.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tripmesh_core_types::{AgentCapabilities, NodeKind, TaskType, TripPlan};

use super::AGENT_KIND_AUDIT;
use crate::agentic::agent::{AgentContext, AgentReply, AgentTask, PlanAgent};
use crate::agentic::executor::ProgressReporter;
use crate::util::errors::TripMeshResult;
use crate::util::ids::now_ms;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFinding {
    /// "warning" or "info".
    pub severity: String,
    #[serde(default)]
    pub day_number: Option<u32>,
    #[serde(default)]
    pub node_id: Option<String>,
    pub message: String,
}

pub struct PlanAuditAgent;

impl PlanAuditAgent {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlanAuditAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlanAgent for PlanAuditAgent {
    fn id(&self) -> &str {
        "plan-audit"
    }

    fn kind(&self) -> &str {
        AGENT_KIND_AUDIT
    }

    fn capabilities(&self) -> AgentCapabilities {
        AgentCapabilities {
            task_types: vec![TaskType::Audit],
            data_sections: vec!["audit".to_string()],
            priority: 40,
            enabled: true,
            chat_eligible: false,
            config: Default::default(),
        }
    }

    async fn execute(
        &self,
        ctx: &AgentContext,
        task: &AgentTask,
        progress: &ProgressReporter,
    ) -> TripMeshResult<AgentReply> {
        let plan = ctx.plans.get_snapshot(&task.trip_id)?;
        progress.running(40, "sweep", "Checking plan consistency").await;

        let findings = sweep(&plan);
        let outcome = ctx
            .plans
            .put_side_data(
                &task.trip_id,
                "audit",
                serde_json::json!({
                    "findings": &findings,
                    "generatedAtMs": now_ms(),
                    "planVersion": plan.version,
                }),
                self.id(),
                task.user_id.clone(),
                "Record audit findings",
            )
            .await?;

        Ok(AgentReply {
            text: format!("Audit complete: {} findings", findings.len()),
            new_version: Some(outcome.version),
            diff: Some(outcome.diff),
            data: Some(serde_json::json!({ "findings": &findings })),
        })
    }
}

fn sweep(plan: &TripPlan) -> Vec<AuditFinding> {
    let mut findings = Vec::new();

    for day in &plan.days {
        if day.nodes.is_empty() {
            findings.push(AuditFinding {
                severity: "warning".to_string(),
                day_number: Some(day.day_number),
                node_id: None,
                message: format!("Day {} has no items", day.day_number),
            });
            continue;
        }

        // Overlapping time windows inside one day.
        let mut timed: Vec<(&str, u32, u32)> = Vec::new();
        for node in &day.nodes {
            let Some(window) = &node.time else {
                if node.kind != NodeKind::FreeTime {
                    findings.push(AuditFinding {
                        severity: "info".to_string(),
                        day_number: Some(day.day_number),
                        node_id: Some(node.node_id.clone()),
                        message: format!("\"{}\" has no time window", node.title),
                    });
                }
                continue;
            };
            match (parse_hhmm(&window.start), parse_hhmm(&window.end)) {
                (Some(start), Some(end)) if start < end => {
                    timed.push((&node.node_id, start, end));
                }
                _ => findings.push(AuditFinding {
                    severity: "warning".to_string(),
                    day_number: Some(day.day_number),
                    node_id: Some(node.node_id.clone()),
                    message: format!(
                        "\"{}\" has an invalid time window {}-{}",
                        node.title, window.start, window.end
                    ),
                }),
            }
        }
        timed.sort_by_key(|(_, start, _)| *start);
        for pair in timed.windows(2) {
            let (first_id, _, first_end) = pair[0];
            let (second_id, second_start, _) = pair[1];
            if second_start < first_end {
                findings.push(AuditFinding {
                    severity: "warning".to_string(),
                    day_number: Some(day.day_number),
                    node_id: Some(second_id.to_string()),
                    message: format!("Overlaps with {} on day {}", first_id, day.day_number),
                });
            }
        }

        // Currency drift against plan settings.
        for node in &day.nodes {
            if let Some(cost) = &node.cost {
                if cost.currency != plan.settings.currency {
                    findings.push(AuditFinding {
                        severity: "info".to_string(),
                        day_number: Some(day.day_number),
                        node_id: Some(node.node_id.clone()),
                        message: format!(
                            "\"{}\" priced in {} but the plan uses {}",
                            node.title, cost.currency, plan.settings.currency
                        ),
                    });
                }
            }
        }
    }

    findings
}

fn parse_hhmm(value: &str) -> Option<u32> {
    let (h, m) = value.split_once(':')?;
    let h: u32 = h.parse().ok()?;
    let m: u32 = m.parse().ok()?;
    if h > 23 || m > 59 {
        return None;
    }
    Some(h * 60 + m)
}
