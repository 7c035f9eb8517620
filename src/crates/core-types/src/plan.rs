//! Versioned trip plan document model.
//!
//! The plan is the single shared mutable resource in the system. It is only
//! ever mutated by the change engine, which bumps `version` by exactly one
//! per committed change set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root aggregate: a multi-day itinerary under collaborative edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPlan {
    /// Stable plan id (`trip-{uuid}`).
    pub trip_id: String,
    pub title: String,
    /// Monotonic document version. Starts at 0 for an empty plan and
    /// increases by exactly 1 per committed change set.
    pub version: u64,
    /// Days ordered by contiguous 1-based `day_number`.
    pub days: Vec<PlanDay>,
    /// Per-task-type side channel (bookings, audit findings, research notes).
    /// Keyed by task type string; values are agent-owned JSON.
    #[serde(default)]
    pub agent_data: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub settings: PlanSettings,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

impl TripPlan {
    /// Looks up a day by its 1-based number.
    pub fn day(&self, day_number: u32) -> Option<&PlanDay> {
        self.days.iter().find(|d| d.day_number == day_number)
    }

    pub fn day_mut(&mut self, day_number: u32) -> Option<&mut PlanDay> {
        self.days.iter_mut().find(|d| d.day_number == day_number)
    }

    /// Finds a node anywhere in the plan, returning its owning day number.
    pub fn find_node(&self, node_id: &str) -> Option<(u32, &PlanNode)> {
        self.days.iter().find_map(|d| {
            d.nodes
                .iter()
                .find(|n| n.node_id == node_id)
                .map(|n| (d.day_number, n))
        })
    }

    pub fn node_count(&self) -> usize {
        self.days.iter().map(|d| d.nodes.len()).sum()
    }

    /// Total estimated cost across all days, in minor currency units.
    pub fn total_cost_cents(&self) -> i64 {
        self.days.iter().map(|d| d.total_cost_cents()).sum()
    }
}

/// One itinerary day. Owns its nodes; ordering inside `nodes` is the
/// schedule order shown to travelers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDay {
    /// Contiguous 1-based day number.
    pub day_number: u32,
    /// Calendar date (`YYYY-MM-DD`), when the trip is anchored to dates.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    pub nodes: Vec<PlanNode>,
}

impl PlanDay {
    pub fn new(day_number: u32) -> Self {
        Self {
            day_number,
            date: None,
            summary: None,
            nodes: Vec::new(),
        }
    }

    pub fn node(&self, node_id: &str) -> Option<&PlanNode> {
        self.nodes.iter().find(|n| n.node_id == node_id)
    }

    /// Derived aggregate: sum of node cost estimates, in minor units.
    pub fn total_cost_cents(&self) -> i64 {
        self.nodes
            .iter()
            .filter_map(|n| n.cost.as_ref())
            .map(|c| c.amount_cents)
            .sum()
    }
}

/// Smallest addressable plan item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanNode {
    /// Stable unique id (`node-{uuid}`), assigned at creation and never
    /// reused, so revisions and generated operations can reference it.
    pub node_id: String,
    pub kind: NodeKind,
    pub title: String,
    #[serde(default)]
    pub time: Option<TimeWindow>,
    #[serde(default)]
    pub cost: Option<CostEstimate>,
    #[serde(default)]
    pub details: String,
    /// Locked nodes reject replace/delete/move unless the operation carries
    /// an explicit unlock.
    #[serde(default)]
    pub locked: bool,
}

impl PlanNode {
    /// Materializes a draft with a freshly assigned id.
    pub fn from_draft(node_id: String, draft: NodeDraft) -> Self {
        Self {
            node_id,
            kind: draft.kind,
            title: draft.title,
            time: draft.time,
            cost: draft.cost,
            details: draft.details,
            locked: draft.locked,
        }
    }
}

/// Node payload without identity. Insert and replace operations carry
/// drafts; the change engine owns id assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDraft {
    pub kind: NodeKind,
    pub title: String,
    #[serde(default)]
    pub time: Option<TimeWindow>,
    #[serde(default)]
    pub cost: Option<CostEstimate>,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub locked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Activity,
    Meal,
    Transit,
    Lodging,
    Booking,
    FreeTime,
}

/// Scheduling window within a day, `HH:MM` local time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostEstimate {
    /// Minor currency units (cents).
    pub amount_cents: i64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSettings {
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default = "default_travelers")]
    pub travelers: u32,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_travelers() -> u32 {
    1
}

impl Default for PlanSettings {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            origin: None,
            travelers: default_travelers(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, cents: i64) -> PlanNode {
        PlanNode {
            node_id: id.to_string(),
            kind: NodeKind::Activity,
            title: format!("Node {}", id),
            time: None,
            cost: Some(CostEstimate {
                amount_cents: cents,
                currency: "USD".to_string(),
            }),
            details: String::new(),
            locked: false,
        }
    }

    #[test]
    fn day_totals_sum_node_costs() {
        let mut day = PlanDay::new(1);
        day.nodes.push(node("node-a", 1200));
        day.nodes.push(node("node-b", 800));
        let mut free = node("node-c", 0);
        free.cost = None;
        day.nodes.push(free);

        assert_eq!(day.total_cost_cents(), 2000);
    }

    #[test]
    fn find_node_reports_owning_day() {
        let mut d1 = PlanDay::new(1);
        d1.nodes.push(node("node-a", 0));
        let mut d2 = PlanDay::new(2);
        d2.nodes.push(node("node-b", 0));
        let plan = TripPlan {
            trip_id: "trip-test".to_string(),
            title: "Test".to_string(),
            version: 0,
            days: vec![d1, d2],
            agent_data: BTreeMap::new(),
            settings: PlanSettings::default(),
            created_at_ms: 0,
            updated_at_ms: 0,
        };

        let (day, n) = plan.find_node("node-b").expect("node present");
        assert_eq!(day, 2);
        assert_eq!(n.node_id, "node-b");
        assert!(plan.find_node("node-x").is_none());
    }
}
