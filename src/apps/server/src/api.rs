//! HTTP API
//!
//! Thin transport layer over the core coordinator and plan service. SSE
//! subscriptions wrap a `ChannelSink`; a disconnecting client drops the
//! receiver and the bus unregisters the sink on the next publish.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::stream::Stream;
use futures_util::StreamExt;
use serde::Deserialize;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::debug;

use tripmesh_core::agentic::registry::AgentDescriptor;
use tripmesh_core::service::plan::ApplyOutcome;
use tripmesh_core::{CreateTripRequest, RouteRequest, RouteResponse, TripMeshError};
use tripmesh_core_types::{RevisionRecord, TaskType, TripPlan};
use tripmesh_transport::ChannelSink;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/trips", post(create_trip))
        .route("/api/trips/:trip_id", get(get_trip))
        .route("/api/trips/:trip_id/requests", post(apply_request))
        .route("/api/trips/:trip_id/revisions", get(revision_history))
        .route("/api/trips/:trip_id/rollback", post(rollback))
        .route("/api/trips/:trip_id/audit", post(run_audit))
        .route("/api/trips/:trip_id/events", get(subscribe_events))
        .route("/api/agents", get(list_agents))
        .route("/api/agents/:agent_id/enable", post(enable_agent))
        .route("/api/agents/:agent_id/disable", post(disable_agent))
        .with_state(state)
}

type ApiError = (StatusCode, String);

fn error_response(e: TripMeshError) -> ApiError {
    let status = match &e {
        TripMeshError::NotFound(_) | TripMeshError::NodeNotFound(_) | TripMeshError::DayNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        TripMeshError::Validation(_)
        | TripMeshError::NodeLocked(_)
        | TripMeshError::CapabilityConflict(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

async fn create_trip(
    State(state): State<AppState>,
    Json(req): Json<CreateTripRequest>,
) -> Json<TripPlan> {
    Json(state.plans.create_trip(req))
}

async fn get_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<String>,
) -> Result<Json<TripPlan>, ApiError> {
    state
        .plans
        .get_snapshot(&trip_id)
        .map(Json)
        .map_err(error_response)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApplyRequestBody {
    text: String,
    #[serde(default)]
    user_id: Option<String>,
}

/// Routes one natural-language request. Always 200: failures come back as
/// a response object with an embedded error list.
async fn apply_request(
    State(state): State<AppState>,
    Path(trip_id): Path<String>,
    Json(body): Json<ApplyRequestBody>,
) -> Json<RouteResponse> {
    let response = state
        .coordinator
        .route(RouteRequest {
            trip_id,
            text: body.text,
            user_id: body.user_id,
        })
        .await;
    Json(response)
}

async fn revision_history(
    State(state): State<AppState>,
    Path(trip_id): Path<String>,
) -> Result<Json<Vec<RevisionRecord>>, ApiError> {
    state
        .plans
        .get_snapshot(&trip_id)
        .map_err(error_response)?;
    Ok(Json(state.plans.revision_history(&trip_id).await))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RollbackBody {
    revision_id: String,
    #[serde(default)]
    user_id: Option<String>,
}

async fn rollback(
    State(state): State<AppState>,
    Path(trip_id): Path<String>,
    Json(body): Json<RollbackBody>,
) -> Result<Json<ApplyOutcome>, ApiError> {
    state
        .plans
        .rollback(&trip_id, &body.revision_id, body.user_id)
        .await
        .map(Json)
        .map_err(error_response)
}

/// Pipeline entry for the (non-chat-routable) audit task.
async fn run_audit(
    State(state): State<AppState>,
    Path(trip_id): Path<String>,
) -> Json<RouteResponse> {
    let response = state
        .coordinator
        .run_task(TaskType::Audit, &trip_id, "Scheduled consistency audit", None)
        .await;
    Json(response)
}

async fn subscribe_events(
    State(state): State<AppState>,
    Path(trip_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    state
        .plans
        .get_snapshot(&trip_id)
        .map_err(error_response)?;

    let (sink, rx) = ChannelSink::new();
    debug!("SSE subscriber attached: trip_id={}", trip_id);
    state.events.register_sink(&trip_id, Arc::new(sink));

    let stream = UnboundedReceiverStream::new(rx).map(|event| {
        Ok(Event::default()
            .event("agent")
            .json_data(&event)
            .unwrap_or_default())
    });
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

async fn list_agents(State(state): State<AppState>) -> Json<Vec<AgentDescriptor>> {
    Json(state.registry.list().await)
}

async fn enable_agent(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .registry
        .enable(&agent_id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(error_response)
}

async fn disable_agent(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .registry
        .disable(&agent_id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(error_response)
}
