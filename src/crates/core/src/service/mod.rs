//! Service layer - plan state, change engine, revisions, config.

pub mod config;
pub mod plan;

pub use config::ServerConfig;
pub use plan::{ApplyOutcome, CreateTripRequest, PlanService};
