//! Immutable revision records backing history and rollback.

use serde::{Deserialize, Serialize};

use crate::changes::{ChangeOperation, PlanDiff};

/// One committed change set, recorded exactly once per successful apply.
/// Records are append-only and ordered by resulting version.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionRecord {
    /// `rev-{uuid}`.
    pub revision_id: String,
    pub trip_id: String,
    /// Plan version this revision produced.
    pub version: u64,
    /// Originating agent id.
    pub agent_id: String,
    /// Opaque acting-user identity.
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub reason: String,
    /// The operations that were applied, in application order.
    pub changes: Vec<ChangeOperation>,
    pub diff: PlanDiff,
    pub created_at_ms: i64,
}
