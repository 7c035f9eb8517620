//! In-memory store of current plan states.
//!
//! Holds the committed head of every plan. Mutation goes exclusively
//! through the change engine; the store itself only swaps whole committed
//! documents.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tripmesh_core_types::{PlanDay, PlanSettings, TripPlan};

use crate::util::errors::{TripMeshError, TripMeshResult};
use crate::util::ids::{new_trip_id, now_ms};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTripRequest {
    pub title: String,
    /// Number of empty days to seed, contiguous from day 1.
    pub days: u32,
    #[serde(default)]
    pub settings: Option<PlanSettings>,
    #[serde(default)]
    pub user_id: Option<String>,
}

pub struct PlanStore {
    plans: DashMap<String, TripPlan>,
}

impl PlanStore {
    pub fn new() -> Self {
        Self {
            plans: DashMap::new(),
        }
    }

    /// Creates a new plan at version 0 with empty contiguous days.
    pub fn create(&self, req: CreateTripRequest) -> TripPlan {
        let now = now_ms();
        let plan = TripPlan {
            trip_id: new_trip_id(),
            title: req.title,
            version: 0,
            days: (1..=req.days.max(1)).map(PlanDay::new).collect(),
            agent_data: Default::default(),
            settings: req.settings.unwrap_or_default(),
            created_at_ms: now,
            updated_at_ms: now,
        };
        self.plans.insert(plan.trip_id.clone(), plan.clone());
        plan
    }

    pub fn get_snapshot(&self, trip_id: &str) -> TripMeshResult<TripPlan> {
        self.plans
            .get(trip_id)
            .map(|p| p.clone())
            .ok_or_else(|| TripMeshError::NotFound(format!("Trip not found: {}", trip_id)))
    }

    pub fn contains(&self, trip_id: &str) -> bool {
        self.plans.contains_key(trip_id)
    }

    pub fn list_ids(&self) -> Vec<String> {
        self.plans.iter().map(|e| e.key().clone()).collect()
    }

    /// Swaps in a committed document. Only the change engine calls this,
    /// under the per-plan commit lock.
    pub(crate) fn commit(&self, plan: TripPlan) {
        self.plans.insert(plan.trip_id.clone(), plan);
    }
}

impl Default for PlanStore {
    fn default() -> Self {
        Self::new()
    }
}
