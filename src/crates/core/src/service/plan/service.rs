//! Plan service facade.
//!
//! Bundles the store, the change engine, and the revision store behind one
//! handle that agents and the server share.

use std::sync::Arc;

use tripmesh_core_types::{ChangeSet, RevisionRecord, TripPlan};

use crate::service::plan::engine::{ApplyOutcome, ChangeEngine};
use crate::service::plan::revisions::{MemoryRevisionStore, RevisionStore};
use crate::service::plan::store::{CreateTripRequest, PlanStore};
use crate::service::plan::summary::{summarize_plan, DEFAULT_SUMMARY_BUDGET};
use crate::util::errors::TripMeshResult;

pub struct PlanService {
    store: Arc<PlanStore>,
    revisions: Arc<dyn RevisionStore>,
    engine: ChangeEngine,
}

impl PlanService {
    pub fn new() -> Self {
        Self::with_revision_store(Arc::new(MemoryRevisionStore::new()))
    }

    /// Lets callers (and tests) supply their own revision persistence.
    pub fn with_revision_store(revisions: Arc<dyn RevisionStore>) -> Self {
        let store = Arc::new(PlanStore::new());
        let engine = ChangeEngine::new(store.clone(), revisions.clone());
        Self {
            store,
            revisions,
            engine,
        }
    }

    pub fn create_trip(&self, req: CreateTripRequest) -> TripPlan {
        self.store.create(req)
    }

    pub fn get_snapshot(&self, trip_id: &str) -> TripMeshResult<TripPlan> {
        self.store.get_snapshot(trip_id)
    }

    pub fn list_trip_ids(&self) -> Vec<String> {
        self.store.list_ids()
    }

    pub async fn apply_changeset(
        &self,
        trip_id: &str,
        changeset: ChangeSet,
    ) -> TripMeshResult<ApplyOutcome> {
        self.engine.apply(trip_id, changeset).await
    }

    pub async fn put_side_data(
        &self,
        trip_id: &str,
        section: &str,
        value: serde_json::Value,
        agent_id: &str,
        user_id: Option<String>,
        reason: &str,
    ) -> TripMeshResult<ApplyOutcome> {
        self.engine
            .put_side_data(trip_id, section, value, agent_id, user_id, reason)
            .await
    }

    pub async fn revision_history(&self, trip_id: &str) -> Vec<RevisionRecord> {
        self.revisions.history(trip_id).await
    }

    /// Read-only reconstruction of the state as of one revision.
    pub async fn reconstruct(&self, trip_id: &str, revision_id: &str) -> TripMeshResult<TripPlan> {
        self.revisions.reconstruct(trip_id, revision_id).await
    }

    /// Commits the reconstructed state as a new version with its own
    /// revision record.
    pub async fn rollback(
        &self,
        trip_id: &str,
        revision_id: &str,
        user_id: Option<String>,
    ) -> TripMeshResult<ApplyOutcome> {
        self.engine.restore(trip_id, revision_id, user_id).await
    }

    pub fn summarize(&self, trip_id: &str) -> TripMeshResult<String> {
        let plan = self.store.get_snapshot(trip_id)?;
        Ok(summarize_plan(&plan, DEFAULT_SUMMARY_BUDGET))
    }
}

impl Default for PlanService {
    fn default() -> Self {
        Self::new()
    }
}
