//! Append-only revision storage.
//!
//! Written only by the change engine, and written *before* commit: a save
//! failure aborts the apply with the plan unchanged. Each record carries
//! the exact post-commit snapshot, so reconstruction is a snapshot restore
//! rather than an operation replay.

use async_trait::async_trait;
use dashmap::DashMap;
use tripmesh_core_types::{RevisionRecord, TripPlan};

use crate::util::errors::{TripMeshError, TripMeshResult};

#[async_trait]
pub trait RevisionStore: Send + Sync {
    /// Appends one record with the plan state it produced.
    async fn save(&self, record: RevisionRecord, snapshot: TripPlan) -> TripMeshResult<()>;

    /// All records for a trip, newest first.
    async fn history(&self, trip_id: &str) -> Vec<RevisionRecord>;

    /// Rebuilds the plan exactly as of `revision_id`: deterministic,
    /// idempotent, version equal to the record's version.
    async fn reconstruct(&self, trip_id: &str, revision_id: &str) -> TripMeshResult<TripPlan>;
}

struct StoredRevision {
    record: RevisionRecord,
    snapshot: TripPlan,
}

pub struct MemoryRevisionStore {
    // Per-trip append-only lists, oldest first.
    revisions: DashMap<String, Vec<StoredRevision>>,
}

impl MemoryRevisionStore {
    pub fn new() -> Self {
        Self {
            revisions: DashMap::new(),
        }
    }
}

impl Default for MemoryRevisionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RevisionStore for MemoryRevisionStore {
    async fn save(&self, record: RevisionRecord, snapshot: TripPlan) -> TripMeshResult<()> {
        self.revisions
            .entry(record.trip_id.clone())
            .or_default()
            .push(StoredRevision { record, snapshot });
        Ok(())
    }

    async fn history(&self, trip_id: &str) -> Vec<RevisionRecord> {
        self.revisions
            .get(trip_id)
            .map(|list| list.iter().rev().map(|r| r.record.clone()).collect())
            .unwrap_or_default()
    }

    async fn reconstruct(&self, trip_id: &str, revision_id: &str) -> TripMeshResult<TripPlan> {
        self.revisions
            .get(trip_id)
            .and_then(|list| {
                list.iter()
                    .find(|r| r.record.revision_id == revision_id)
                    .map(|r| r.snapshot.clone())
            })
            .ok_or_else(|| {
                TripMeshError::NotFound(format!(
                    "Revision not found: trip_id={}, revision_id={}",
                    trip_id, revision_id
                ))
            })
    }
}
