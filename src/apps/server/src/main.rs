//! TripMesh server - HTTP/SSE binding for the core coordinator.

mod api;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tripmesh_core::agentic::registry::AgentRegistry;
use tripmesh_core::agentic::register_default_agents;
use tripmesh_core::infrastructure::events::get_global_event_system;
use tripmesh_core::service::plan::PlanService;
use tripmesh_core::{
    AgentContext, HttpAiClient, HttpBookingProvider, PlanCoordinator, ServerConfig,
};

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var("TRIPMESH_CONFIG").ok().map(PathBuf::from);
    let config = ServerConfig::load(config_path.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();
    info!(
        "Starting {} v{}",
        tripmesh_core::CORE_NAME,
        tripmesh_core::VERSION
    );

    let ai = Arc::new(HttpAiClient::new(
        config.ai.base_url.clone(),
        config.ai.model.clone(),
        config.ai_api_key(),
    )?);
    let booking = Arc::new(HttpBookingProvider::new(config.booking.base_url.clone())?);
    let events = get_global_event_system();
    let plans = Arc::new(PlanService::new());

    let ctx = Arc::new(AgentContext {
        plans: plans.clone(),
        classifier: ai.clone(),
        generator: ai,
        booking,
        events: events.clone(),
    });

    let registry = Arc::new(AgentRegistry::new());
    register_default_agents(&registry).await?;

    let coordinator = Arc::new(PlanCoordinator::new(registry.clone(), ctx));
    let app = api::router(AppState {
        coordinator,
        plans,
        events,
        registry,
    })
    .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("TripMesh server listening: addr={}", config.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
