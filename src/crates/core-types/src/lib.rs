//! TripMesh shared low-level product DTOs.
//!
//! Serde-only data model shared by the core crate, the transport layer, and
//! the server app: plan documents, change sets, revision records, capability
//! declarations, and agent progress events.

pub mod capability;
pub mod changes;
pub mod event;
pub mod plan;
pub mod revision;

pub use capability::{AgentCapabilities, TaskType};
pub use changes::{ChangeOperation, ChangeScope, ChangeSet, DayDiff, PlanDiff};
pub use event::{AgentEvent, AgentStatus};
pub use plan::{
    CostEstimate, NodeDraft, NodeKind, PlanDay, PlanNode, PlanSettings, TimeWindow, TripPlan,
};
pub use revision::RevisionRecord;
