//! Change engine behavior: atomicity, locking, versioning, write-ahead.

mod support;

use std::sync::Arc;

use support::{changeset, draft, insert_op, seed_trip};
use tripmesh_core::service::plan::PlanService;
use tripmesh_core::TripMeshError;
use tripmesh_core_types::{ChangeOperation, TimeWindow};

#[tokio::test]
async fn replace_bumps_version_and_records_revision() {
    let plans = PlanService::new();
    let trip = seed_trip(&plans, "Tokyo", 3);

    // Reach v3 with three applies.
    for i in 0..3 {
        plans
            .apply_changeset(
                &trip.trip_id,
                changeset("editor", vec![insert_op(2, &format!("Stop {}", i))]),
            )
            .await
            .expect("apply");
    }
    let plan = plans.get_snapshot(&trip.trip_id).expect("snapshot");
    assert_eq!(plan.version, 3);
    let node_id = plan.day(2).expect("day 2").nodes[0].node_id.clone();

    let outcome = plans
        .apply_changeset(
            &trip.trip_id,
            changeset(
                "editor",
                vec![ChangeOperation::Replace {
                    node_id: node_id.clone(),
                    node: draft("X"),
                    unlock: false,
                }],
            ),
        )
        .await
        .expect("replace");

    assert_eq!(outcome.version, 4);
    let plan = plans.get_snapshot(&trip.trip_id).expect("snapshot");
    assert_eq!(plan.version, 4);
    let (day, node) = plan.find_node(&node_id).expect("node survives");
    assert_eq!(day, 2);
    assert_eq!(node.title, "X");
    assert_eq!(plans.revision_history(&trip.trip_id).await.len(), 4);
    assert_eq!(
        outcome.diff.days.get(&2).expect("day diff").modified,
        vec![node_id]
    );
}

#[tokio::test]
async fn locked_node_rejects_mutation_without_unlock() {
    let plans = PlanService::new();
    let trip = seed_trip(&plans, "Tokyo", 2);

    let mut locked = draft("Shinkansen");
    locked.locked = true;
    plans
        .apply_changeset(
            &trip.trip_id,
            changeset(
                "editor",
                vec![ChangeOperation::Insert {
                    day: 1,
                    node: locked,
                    position: None,
                }],
            ),
        )
        .await
        .expect("seed locked node");
    let plan = plans.get_snapshot(&trip.trip_id).expect("snapshot");
    let node_id = plan.day(1).expect("day").nodes[0].node_id.clone();
    assert_eq!(plan.version, 1);

    let err = plans
        .apply_changeset(
            &trip.trip_id,
            changeset(
                "editor",
                vec![ChangeOperation::Replace {
                    node_id: node_id.clone(),
                    node: draft("Later train"),
                    unlock: false,
                }],
            ),
        )
        .await
        .expect_err("locked");
    assert!(matches!(err, TripMeshError::NodeLocked(_)));

    // Untouched: same version, same title, no extra revision.
    let plan = plans.get_snapshot(&trip.trip_id).expect("snapshot");
    assert_eq!(plan.version, 1);
    assert_eq!(plan.day(1).expect("day").nodes[0].title, "Shinkansen");
    assert_eq!(plans.revision_history(&trip.trip_id).await.len(), 1);

    // Explicit unlock goes through.
    let outcome = plans
        .apply_changeset(
            &trip.trip_id,
            changeset(
                "editor",
                vec![ChangeOperation::Replace {
                    node_id,
                    node: draft("Later train"),
                    unlock: true,
                }],
            ),
        )
        .await
        .expect("unlock replace");
    assert_eq!(outcome.version, 2);
}

#[tokio::test]
async fn batch_is_atomic_when_a_later_operation_fails() {
    let plans = PlanService::new();
    let trip = seed_trip(&plans, "Tokyo", 2);

    let err = plans
        .apply_changeset(
            &trip.trip_id,
            changeset(
                "editor",
                vec![
                    insert_op(1, "Breakfast"),
                    ChangeOperation::Delete {
                        node_id: "node-does-not-exist".to_string(),
                        unlock: false,
                    },
                ],
            ),
        )
        .await
        .expect_err("second op fails");
    assert!(matches!(err, TripMeshError::NodeNotFound(_)));

    // The first operation's insert must not have leaked.
    let plan = plans.get_snapshot(&trip.trip_id).expect("snapshot");
    assert_eq!(plan.version, 0);
    assert_eq!(plan.node_count(), 0);
    assert!(plans.revision_history(&trip.trip_id).await.is_empty());
}

#[tokio::test]
async fn move_relocates_across_days_and_retimes() {
    let plans = PlanService::new();
    let trip = seed_trip(&plans, "Tokyo", 3);

    plans
        .apply_changeset(&trip.trip_id, changeset("editor", vec![insert_op(1, "Museum")]))
        .await
        .expect("seed");
    let plan = plans.get_snapshot(&trip.trip_id).expect("snapshot");
    let node_id = plan.day(1).expect("day").nodes[0].node_id.clone();

    let outcome = plans
        .apply_changeset(
            &trip.trip_id,
            changeset(
                "editor",
                vec![ChangeOperation::Move {
                    node_id: node_id.clone(),
                    to_day: 3,
                    position: Some(0),
                    new_time: Some(TimeWindow {
                        start: "14:00".to_string(),
                        end: "16:00".to_string(),
                    }),
                    unlock: false,
                }],
            ),
        )
        .await
        .expect("move");

    let plan = plans.get_snapshot(&trip.trip_id).expect("snapshot");
    assert!(plan.day(1).expect("day 1").nodes.is_empty());
    let (day, node) = plan.find_node(&node_id).expect("node");
    assert_eq!(day, 3);
    assert_eq!(node.time.as_ref().expect("time").start, "14:00");

    // Cross-day move reads as removed from source, added to target.
    assert_eq!(outcome.diff.days.get(&1).expect("d1").removed, vec![node_id.clone()]);
    assert_eq!(outcome.diff.days.get(&3).expect("d3").added, vec![node_id]);
}

#[tokio::test]
async fn concurrent_applies_on_one_plan_never_lose_updates() {
    let plans = Arc::new(PlanService::new());
    let trip = seed_trip(&plans, "Tokyo", 2);

    let mut handles = Vec::new();
    for i in 0..8 {
        let plans = plans.clone();
        let trip_id = trip.trip_id.clone();
        handles.push(tokio::spawn(async move {
            plans
                .apply_changeset(
                    &trip_id,
                    changeset("editor", vec![insert_op(1 + (i % 2), &format!("Item {}", i))]),
                )
                .await
        }));
    }

    let mut versions = Vec::new();
    for handle in handles {
        versions.push(handle.await.expect("join").expect("apply").version);
    }
    versions.sort_unstable();

    // No gaps, no repeats: exactly versions 1..=8.
    assert_eq!(versions, (1..=8).collect::<Vec<u64>>());
    let plan = plans.get_snapshot(&trip.trip_id).expect("snapshot");
    assert_eq!(plan.version, 8);
    assert_eq!(plan.node_count(), 8);
    assert_eq!(plans.revision_history(&trip.trip_id).await.len(), 8);
}

#[tokio::test]
async fn revision_persist_failure_aborts_the_apply() {
    let plans = PlanService::with_revision_store(Arc::new(support::FailingRevisionStore));
    let trip = seed_trip(&plans, "Tokyo", 1);

    let err = plans
        .apply_changeset(&trip.trip_id, changeset("editor", vec![insert_op(1, "Lunch")]))
        .await
        .expect_err("save fails");
    assert!(matches!(err, TripMeshError::RevisionPersistFailure(_)));

    let plan = plans.get_snapshot(&trip.trip_id).expect("snapshot");
    assert_eq!(plan.version, 0);
    assert_eq!(plan.node_count(), 0);
}

#[tokio::test]
async fn side_data_commits_are_versioned_and_recorded() {
    let plans = PlanService::new();
    let trip = seed_trip(&plans, "Tokyo", 1);

    let outcome = plans
        .put_side_data(
            &trip.trip_id,
            "bookings",
            serde_json::json!({"options": []}),
            "booking",
            None,
            "Record booking search results",
        )
        .await
        .expect("side data");

    assert_eq!(outcome.version, 1);
    assert!(outcome.diff.is_empty());
    let plan = plans.get_snapshot(&trip.trip_id).expect("snapshot");
    assert!(plan.agent_data.contains_key("bookings"));
    assert_eq!(plans.revision_history(&trip.trip_id).await.len(), 1);
}
