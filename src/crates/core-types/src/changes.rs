//! Structured mutation model: change sets, operations, and diffs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::plan::{NodeDraft, TimeWindow};

/// What part of the plan a change set targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum ChangeScope {
    TripWide,
    #[serde(rename_all = "camelCase")]
    Day { day_number: u32 },
}

/// One structured edit. Operations inside a change set apply in array order
/// against a working copy; the batch commits all-or-nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeOperation {
    /// Appends (or inserts at `position`) a new node into the target day.
    #[serde(rename_all = "camelCase")]
    Insert {
        day: u32,
        node: NodeDraft,
        #[serde(default)]
        position: Option<usize>,
    },
    /// Substitutes an existing node's fields by id. The node keeps its id.
    #[serde(rename_all = "camelCase")]
    Replace {
        node_id: String,
        node: NodeDraft,
        #[serde(default)]
        unlock: bool,
    },
    #[serde(rename_all = "camelCase")]
    Delete {
        node_id: String,
        #[serde(default)]
        unlock: bool,
    },
    /// Relocates a node across day/position, optionally retiming it.
    #[serde(rename_all = "camelCase")]
    Move {
        node_id: String,
        to_day: u32,
        #[serde(default)]
        position: Option<usize>,
        #[serde(default)]
        new_time: Option<TimeWindow>,
        #[serde(default)]
        unlock: bool,
    },
}

impl ChangeOperation {
    /// The existing node this operation targets, if any. Inserts create
    /// nodes and target none.
    pub fn target_node_id(&self) -> Option<&str> {
        match self {
            ChangeOperation::Insert { .. } => None,
            ChangeOperation::Replace { node_id, .. }
            | ChangeOperation::Delete { node_id, .. }
            | ChangeOperation::Move { node_id, .. } => Some(node_id),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ChangeOperation::Insert { .. } => "insert",
            ChangeOperation::Replace { .. } => "replace",
            ChangeOperation::Delete { .. } => "delete",
            ChangeOperation::Move { .. } => "move",
        }
    }
}

/// Named, attributable batch of operations. Atomic: all or none.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSet {
    /// `cs-{uuid}`.
    pub changeset_id: String,
    pub name: String,
    pub scope: ChangeScope,
    pub operations: Vec<ChangeOperation>,
    /// Why this change was made; carried verbatim into the revision record.
    #[serde(default)]
    pub reason: String,
    /// Originating agent id.
    pub agent_id: String,
    /// Opaque acting-user identity, passed through unchanged.
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Structural diff of one committed change set, per day.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDiff {
    pub version_from: u64,
    pub version_to: u64,
    /// Keyed by day number; only touched days appear.
    #[serde(default)]
    pub days: BTreeMap<u32, DayDiff>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayDiff {
    #[serde(default)]
    pub added: Vec<String>,
    #[serde(default)]
    pub removed: Vec<String>,
    #[serde(default)]
    pub modified: Vec<String>,
}

impl PlanDiff {
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn touched_nodes(&self) -> usize {
        self.days
            .values()
            .map(|d| d.added.len() + d.removed.len() + d.modified.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::NodeKind;

    #[test]
    fn operations_use_internally_tagged_wire_format() {
        let op = ChangeOperation::Replace {
            node_id: "node-1".to_string(),
            node: NodeDraft {
                kind: NodeKind::Meal,
                title: "Dinner".to_string(),
                time: None,
                cost: None,
                details: String::new(),
                locked: false,
            },
            unlock: false,
        };

        let value = serde_json::to_value(&op).expect("serialize");
        assert_eq!(value["type"], "replace");
        assert_eq!(value["nodeId"], "node-1");

        let parsed: ChangeOperation = serde_json::from_value(serde_json::json!({
            "type": "delete",
            "nodeId": "node-2",
        }))
        .expect("deserialize");
        assert_eq!(parsed.target_node_id(), Some("node-2"));
        assert_eq!(parsed.kind_name(), "delete");
    }
}
