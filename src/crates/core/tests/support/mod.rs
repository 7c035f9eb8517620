//! Scripted doubles and fixtures shared by the integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use tripmesh_core::infrastructure::ai::{Classification, ContentGenerator, IntentClassifier};
use tripmesh_core::infrastructure::events::BackendEventSystem;
use tripmesh_core::infrastructure::integrations::{
    BookingConfirmation, BookingCriteria, BookingOption, BookingProvider,
};
use tripmesh_core::service::plan::{PlanService, RevisionStore};
use tripmesh_core::{AgentContext, CreateTripRequest, TripMeshError, TripMeshResult};
use tripmesh_core_types::{
    ChangeOperation, ChangeScope, ChangeSet, NodeDraft, NodeKind, RevisionRecord, TaskType,
    TripPlan,
};

pub struct ScriptedClassifier {
    pub classification: Classification,
}

impl ScriptedClassifier {
    pub fn new(task_type: TaskType, intent: &str) -> Self {
        Self {
            classification: Classification {
                intent: intent.to_string(),
                task_type,
                confidence: 0.9,
            },
        }
    }
}

#[async_trait]
impl IntentClassifier for ScriptedClassifier {
    async fn classify(&self, _text: &str, _context: &str) -> TripMeshResult<Classification> {
        Ok(self.classification.clone())
    }
}

pub struct FailingClassifier;

#[async_trait]
impl IntentClassifier for FailingClassifier {
    async fn classify(&self, _text: &str, _context: &str) -> TripMeshResult<Classification> {
        Err(TripMeshError::ExternalService(
            "classifier unreachable".to_string(),
        ))
    }
}

/// Replays queued responses in order; erroring once the script runs dry.
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<String>>,
}

impl ScriptedGenerator {
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(String::from).collect()),
        }
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    async fn generate(&self, _prompt: &str, _context: &str) -> TripMeshResult<String> {
        self.responses
            .lock()
            .expect("generator script lock")
            .pop_front()
            .ok_or_else(|| TripMeshError::ExternalService("generator script exhausted".to_string()))
    }
}

pub struct ScriptedBooking {
    pub options: Vec<BookingOption>,
}

impl ScriptedBooking {
    pub fn with_options(count: usize) -> Self {
        let options = (1..=count)
            .map(|i| BookingOption {
                option_id: format!("opt-{}", i),
                name: format!("Option {}", i),
                description: String::new(),
                price_cents: 10_000 * i as i64,
                currency: "USD".to_string(),
                rating: Some(4.0),
            })
            .collect();
        Self { options }
    }
}

#[async_trait]
impl BookingProvider for ScriptedBooking {
    async fn search(&self, _criteria: &BookingCriteria) -> TripMeshResult<Vec<BookingOption>> {
        Ok(self.options.clone())
    }

    async fn confirm(
        &self,
        option_id: &str,
        _payment_proof: &str,
    ) -> TripMeshResult<BookingConfirmation> {
        Ok(BookingConfirmation {
            confirmation_id: format!("conf-{}", option_id),
            option_id: option_id.to_string(),
            status: "confirmed".to_string(),
            details: String::new(),
        })
    }
}

pub struct NullBooking;

#[async_trait]
impl BookingProvider for NullBooking {
    async fn search(&self, _criteria: &BookingCriteria) -> TripMeshResult<Vec<BookingOption>> {
        Ok(Vec::new())
    }

    async fn confirm(
        &self,
        _option_id: &str,
        _payment_proof: &str,
    ) -> TripMeshResult<BookingConfirmation> {
        Err(TripMeshError::ExternalService(
            "no booking backend".to_string(),
        ))
    }
}

/// Revision store whose saves always fail, for write-ahead abort tests.
pub struct FailingRevisionStore;

#[async_trait]
impl RevisionStore for FailingRevisionStore {
    async fn save(&self, _record: RevisionRecord, _snapshot: TripPlan) -> TripMeshResult<()> {
        Err(TripMeshError::ExternalService("revision disk full".to_string()))
    }

    async fn history(&self, _trip_id: &str) -> Vec<RevisionRecord> {
        Vec::new()
    }

    async fn reconstruct(&self, trip_id: &str, revision_id: &str) -> TripMeshResult<TripPlan> {
        Err(TripMeshError::NotFound(format!(
            "{}/{}",
            trip_id, revision_id
        )))
    }
}

pub fn test_context(
    plans: Arc<PlanService>,
    classifier: Arc<dyn IntentClassifier>,
    generator: Arc<dyn ContentGenerator>,
    booking: Arc<dyn BookingProvider>,
) -> (Arc<AgentContext>, Arc<BackendEventSystem>) {
    let events = Arc::new(BackendEventSystem::new());
    let ctx = Arc::new(AgentContext {
        plans,
        classifier,
        generator,
        booking,
        events: events.clone(),
    });
    (ctx, events)
}

pub fn seed_trip(plans: &PlanService, title: &str, days: u32) -> TripPlan {
    plans.create_trip(CreateTripRequest {
        title: title.to_string(),
        days,
        settings: None,
        user_id: Some("user-1".to_string()),
    })
}

pub fn insert_op(day: u32, title: &str) -> ChangeOperation {
    ChangeOperation::Insert {
        day,
        node: draft(title),
        position: None,
    }
}

pub fn draft(title: &str) -> NodeDraft {
    NodeDraft {
        kind: NodeKind::Activity,
        title: title.to_string(),
        time: None,
        cost: None,
        details: String::new(),
        locked: false,
    }
}

pub fn changeset(agent_id: &str, operations: Vec<ChangeOperation>) -> ChangeSet {
    ChangeSet {
        changeset_id: format!("cs-test-{}", operations.len()),
        name: "test change".to_string(),
        scope: ChangeScope::TripWide,
        operations,
        reason: "test".to_string(),
        agent_id: agent_id.to_string(),
        user_id: Some("user-1".to_string()),
    }
}
