//! Utility layer - error types, ids, time helpers.

pub mod errors;
pub mod ids;

pub use errors::{TripMeshError, TripMeshResult};
pub use ids::{new_changeset_id, new_node_id, new_revision_id, new_trip_id, now_ms};
