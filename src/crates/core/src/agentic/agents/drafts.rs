//! Parsing of generated change drafts.
//!
//! The generator returns free text; agents cut the JSON object out and
//! deserialize it into real operations. Parse failure is recoverable: the
//! planner and editor regenerate once with the parse error appended before
//! surfacing.

use serde::Deserialize;
use tripmesh_core_types::ChangeOperation;

use crate::infrastructure::ai::parse_json_payload;
use crate::util::errors::TripMeshResult;

/// Wire shape agents ask the model for.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub reason: String,
    pub operations: Vec<ChangeOperation>,
}

pub fn parse_change_draft(model_text: &str) -> TripMeshResult<ChangeDraft> {
    parse_json_payload(model_text)
}

/// Shared schema block embedded in generation prompts. Node ids come from
/// the plan summary; drafts for new nodes omit ids entirely.
pub const OPERATIONS_SCHEMA: &str = r#"Output STRICT JSON ONLY (no markdown, no commentary) with this schema:
{
  "name": "short change title",
  "reason": "one sentence",
  "operations": [
    {"type": "insert", "day": 1, "node": {"kind": "activity|meal|transit|lodging|booking|free_time", "title": "string", "time": {"start": "HH:MM", "end": "HH:MM"}, "cost": {"amountCents": 0, "currency": "USD"}, "details": "string"}},
    {"type": "replace", "nodeId": "node-...", "node": {...same shape as insert node...}},
    {"type": "delete", "nodeId": "node-..."},
    {"type": "move", "nodeId": "node-...", "toDay": 2, "position": 0, "newTime": {"start": "HH:MM", "end": "HH:MM"}}
  ]
}

Rules:
- nodeId values MUST be ids that appear in the plan summary (inside [brackets]).
- "time" and "cost" are optional; omit them rather than inventing values.
- Never touch nodes marked [locked] in the summary.
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_draft_with_mixed_operations() {
        let text = r#"Sure! Here is the change:
{
  "name": "Swap lunch",
  "reason": "User asked for ramen",
  "operations": [
    {"type": "delete", "nodeId": "node-1"},
    {"type": "insert", "day": 2, "node": {"kind": "meal", "title": "Ramen"}}
  ]
}"#;
        let draft = parse_change_draft(text).expect("parse");
        assert_eq!(draft.operations.len(), 2);
        assert_eq!(draft.operations[0].kind_name(), "delete");
        assert_eq!(draft.operations[1].kind_name(), "insert");
    }

    #[test]
    fn missing_operations_is_a_parse_failure() {
        assert!(parse_change_draft(r#"{"name": "x"}"#).is_err());
    }
}
