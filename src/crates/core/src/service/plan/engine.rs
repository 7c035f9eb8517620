//! Change engine: the only writer of plan state.
//!
//! Applies a change set against a working copy, diffs it, records the
//! revision, and only then commits the copy as version N+1. Commits are
//! serialized per trip id, so concurrent applies to one plan cannot lose
//! updates; applies to different plans proceed independently.

use std::collections::BTreeSet;
use std::sync::Arc;

use dashmap::DashMap;
use log::debug;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tripmesh_core_types::{
    ChangeOperation, ChangeSet, DayDiff, PlanDiff, PlanNode, RevisionRecord, TripPlan,
};

use crate::service::plan::revisions::RevisionStore;
use crate::service::plan::store::PlanStore;
use crate::util::errors::{TripMeshError, TripMeshResult};
use crate::util::ids::{new_node_id, new_revision_id, now_ms};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyOutcome {
    pub version: u64,
    pub revision_id: String,
    pub diff: PlanDiff,
}

pub struct ChangeEngine {
    store: Arc<PlanStore>,
    revisions: Arc<dyn RevisionStore>,
    commit_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ChangeEngine {
    pub fn new(store: Arc<PlanStore>, revisions: Arc<dyn RevisionStore>) -> Self {
        Self {
            store,
            revisions,
            commit_locks: DashMap::new(),
        }
    }

    fn commit_lock(&self, trip_id: &str) -> Arc<Mutex<()>> {
        self.commit_locks
            .entry(trip_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Applies one change set atomically. Either every operation's effect
    /// appears in version N+1 or the plan stays at version N.
    pub async fn apply(&self, trip_id: &str, changeset: ChangeSet) -> TripMeshResult<ApplyOutcome> {
        let lock = self.commit_lock(trip_id);
        let _guard = lock.lock().await;

        let current = self.store.get_snapshot(trip_id)?;
        let mut working = current.clone();

        for op in &changeset.operations {
            apply_operation(&mut working, op)?;
        }

        let mut diff = compute_diff(&current, &working);
        diff.version_from = current.version;
        diff.version_to = current.version + 1;

        working.version = current.version + 1;
        working.updated_at_ms = now_ms();

        let record = RevisionRecord {
            revision_id: new_revision_id(),
            trip_id: trip_id.to_string(),
            version: working.version,
            agent_id: changeset.agent_id.clone(),
            user_id: changeset.user_id.clone(),
            reason: changeset.reason.clone(),
            changes: changeset.operations.clone(),
            diff: diff.clone(),
            created_at_ms: now_ms(),
        };
        let revision_id = record.revision_id.clone();

        // Write-ahead: the revision must be durable before the commit. A
        // failed save leaves the plan at version N.
        self.revisions
            .save(record, working.clone())
            .await
            .map_err(|e| TripMeshError::RevisionPersistFailure(e.to_string()))?;

        self.store.commit(working);
        debug!(
            "Change set applied: trip_id={}, version={}, ops={}, revision_id={}",
            trip_id,
            diff.version_to,
            changeset.operations.len(),
            revision_id
        );

        Ok(ApplyOutcome {
            version: diff.version_to,
            revision_id,
            diff,
        })
    }

    /// Writes one side-channel section (`agent_data`) as its own versioned
    /// commit. Side data lives outside the day/node tree but follows the
    /// same rule: no mutation without a revision.
    pub async fn put_side_data(
        &self,
        trip_id: &str,
        section: &str,
        value: serde_json::Value,
        agent_id: &str,
        user_id: Option<String>,
        reason: &str,
    ) -> TripMeshResult<ApplyOutcome> {
        let lock = self.commit_lock(trip_id);
        let _guard = lock.lock().await;

        let current = self.store.get_snapshot(trip_id)?;
        let mut working = current.clone();
        working.agent_data.insert(section.to_string(), value);
        working.version = current.version + 1;
        working.updated_at_ms = now_ms();

        let diff = PlanDiff {
            version_from: current.version,
            version_to: working.version,
            days: Default::default(),
        };
        let record = RevisionRecord {
            revision_id: new_revision_id(),
            trip_id: trip_id.to_string(),
            version: working.version,
            agent_id: agent_id.to_string(),
            user_id,
            reason: reason.to_string(),
            changes: Vec::new(),
            diff: diff.clone(),
            created_at_ms: now_ms(),
        };
        let revision_id = record.revision_id.clone();

        self.revisions
            .save(record, working.clone())
            .await
            .map_err(|e| TripMeshError::RevisionPersistFailure(e.to_string()))?;
        self.store.commit(working);

        Ok(ApplyOutcome {
            version: diff.version_to,
            revision_id,
            diff,
        })
    }

    /// Restores the state captured at `revision_id` as a *new* version,
    /// with its own revision record. History stays intact and the version
    /// counter stays monotonic.
    pub async fn restore(
        &self,
        trip_id: &str,
        revision_id: &str,
        user_id: Option<String>,
    ) -> TripMeshResult<ApplyOutcome> {
        let lock = self.commit_lock(trip_id);
        let _guard = lock.lock().await;

        let current = self.store.get_snapshot(trip_id)?;
        let target = self.revisions.reconstruct(trip_id, revision_id).await?;

        let mut working = target;
        working.version = current.version + 1;
        working.created_at_ms = current.created_at_ms;
        working.updated_at_ms = now_ms();

        let mut diff = compute_diff(&current, &working);
        diff.version_from = current.version;
        diff.version_to = working.version;

        let record = RevisionRecord {
            revision_id: new_revision_id(),
            trip_id: trip_id.to_string(),
            version: working.version,
            agent_id: "system".to_string(),
            user_id,
            reason: format!("Rollback to revision {}", revision_id),
            changes: Vec::new(),
            diff: diff.clone(),
            created_at_ms: now_ms(),
        };
        let new_revision_id = record.revision_id.clone();

        self.revisions
            .save(record, working.clone())
            .await
            .map_err(|e| TripMeshError::RevisionPersistFailure(e.to_string()))?;
        self.store.commit(working);

        Ok(ApplyOutcome {
            version: diff.version_to,
            revision_id: new_revision_id,
            diff,
        })
    }
}

fn ensure_unlocked(node: &PlanNode, unlock: bool) -> TripMeshResult<()> {
    if node.locked && !unlock {
        return Err(TripMeshError::NodeLocked(node.node_id.clone()));
    }
    Ok(())
}

fn apply_operation(working: &mut TripPlan, op: &ChangeOperation) -> TripMeshResult<()> {
    match op {
        ChangeOperation::Insert {
            day,
            node,
            position,
        } => {
            let day = working
                .day_mut(*day)
                .ok_or(TripMeshError::DayNotFound(*day))?;
            let new_node = PlanNode::from_draft(new_node_id(), node.clone());
            match position {
                Some(pos) => {
                    let pos = (*pos).min(day.nodes.len());
                    day.nodes.insert(pos, new_node);
                }
                None => day.nodes.push(new_node),
            }
            Ok(())
        }
        ChangeOperation::Replace {
            node_id,
            node,
            unlock,
        } => {
            let existing = working
                .days
                .iter_mut()
                .flat_map(|d| d.nodes.iter_mut())
                .find(|n| n.node_id == *node_id)
                .ok_or_else(|| TripMeshError::NodeNotFound(node_id.clone()))?;
            ensure_unlocked(existing, *unlock)?;
            *existing = PlanNode::from_draft(existing.node_id.clone(), node.clone());
            Ok(())
        }
        ChangeOperation::Delete { node_id, unlock } => {
            let day = working
                .days
                .iter_mut()
                .find(|d| d.nodes.iter().any(|n| n.node_id == *node_id))
                .ok_or_else(|| TripMeshError::NodeNotFound(node_id.clone()))?;
            let node = day
                .nodes
                .iter()
                .find(|n| n.node_id == *node_id)
                .expect("node present in located day");
            ensure_unlocked(node, *unlock)?;
            day.nodes.retain(|n| n.node_id != *node_id);
            Ok(())
        }
        ChangeOperation::Move {
            node_id,
            to_day,
            position,
            new_time,
            unlock,
        } => {
            if working.day(*to_day).is_none() {
                return Err(TripMeshError::DayNotFound(*to_day));
            }
            let source = working
                .days
                .iter_mut()
                .find(|d| d.nodes.iter().any(|n| n.node_id == *node_id))
                .ok_or_else(|| TripMeshError::NodeNotFound(node_id.clone()))?;
            let idx = source
                .nodes
                .iter()
                .position(|n| n.node_id == *node_id)
                .expect("node present in located day");
            ensure_unlocked(&source.nodes[idx], *unlock)?;

            let mut node = source.nodes.remove(idx);
            if let Some(time) = new_time {
                node.time = Some(time.clone());
            }
            let target = working
                .day_mut(*to_day)
                .expect("target day checked above");
            match position {
                Some(pos) => {
                    let pos = (*pos).min(target.nodes.len());
                    target.nodes.insert(pos, node);
                }
                None => target.nodes.push(node),
            }
            Ok(())
        }
    }
}

/// Per-day structural diff: node ids added, removed, and modified. A move
/// across days reads as removed from the source day and added to the
/// target day.
fn compute_diff(before: &TripPlan, after: &TripPlan) -> PlanDiff {
    let mut diff = PlanDiff::default();

    let day_numbers: BTreeSet<u32> = before
        .days
        .iter()
        .chain(after.days.iter())
        .map(|d| d.day_number)
        .collect();

    for day_number in day_numbers {
        let old_nodes: Vec<&PlanNode> = before
            .day(day_number)
            .map(|d| d.nodes.iter().collect())
            .unwrap_or_default();
        let new_nodes: Vec<&PlanNode> = after
            .day(day_number)
            .map(|d| d.nodes.iter().collect())
            .unwrap_or_default();

        let mut day_diff = DayDiff::default();
        for node in &new_nodes {
            match old_nodes.iter().find(|n| n.node_id == node.node_id) {
                None => day_diff.added.push(node.node_id.clone()),
                Some(old) if *old != *node => day_diff.modified.push(node.node_id.clone()),
                Some(_) => {}
            }
        }
        for node in &old_nodes {
            if !new_nodes.iter().any(|n| n.node_id == node.node_id) {
                day_diff.removed.push(node.node_id.clone());
            }
        }

        if !day_diff.added.is_empty()
            || !day_diff.removed.is_empty()
            || !day_diff.modified.is_empty()
        {
            diff.days.insert(day_number, day_diff);
        }
    }

    diff
}
