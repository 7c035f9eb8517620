//! Plan service: versioned document store, change engine, revisions.

pub mod engine;
pub mod revisions;
pub mod service;
pub mod store;
pub mod summary;

pub use engine::{ApplyOutcome, ChangeEngine};
pub use revisions::{MemoryRevisionStore, RevisionStore};
pub use service::PlanService;
pub use store::{CreateTripRequest, PlanStore};
pub use summary::{summarize_plan, DEFAULT_SUMMARY_BUDGET};
