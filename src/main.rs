//! fixture-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use fixture_gateway::api;
use fixture_gateway::app_state::AppState;
use fixture_gateway::config::GatewayConfig;
use fixture_gateway::domain::{ChangeBus, FixtureRegistry, Roster};
use fixture_gateway::persistence::{PostgresPersistence, run_change_log};
use fixture_gateway::service::FixtureService;
use fixture_gateway::ws::handler::ws_handler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing (LOG_FORMAT=json for structured output)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    // Load configuration
    let config = GatewayConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting fixture-gateway");

    // Build domain layer
    let registry = Arc::new(FixtureRegistry::new());
    let roster = Arc::new(Roster::new());
    let change_bus = ChangeBus::new(config.change_bus_capacity);

    // Build service layer
    let mut service = FixtureService::new(
        registry,
        roster,
        change_bus.clone(),
        config.default_half_length_minutes,
    );

    if config.persistence_enabled {
        let persistence = PostgresPersistence::connect(&config).await?;
        persistence.migrate().await?;
        service.restore(persistence.load_all().await?).await;

        if config.change_log_enabled {
            tokio::spawn(run_change_log(
                persistence.clone(),
                change_bus,
                config.cleanup_after_days,
            ));
        }
        service = service.with_persistence(persistence);
    } else {
        tracing::info!("persistence disabled, state is in-memory only");
    }

    // Build application state
    let app_state = AppState::new(Arc::new(service));

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
