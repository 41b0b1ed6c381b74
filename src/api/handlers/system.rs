//! System endpoints: health check and match rules.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"healthy"` when the process serves requests.
    pub status: String,
    /// Server time, RFC 3339.
    pub timestamp: String,
    /// Crate version.
    pub version: String,
    /// Number of fixtures held in memory.
    pub fixtures: usize,
    /// Number of live change subscribers.
    pub subscribers: usize,
}

/// `GET /health`: Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            fixtures: state.fixture_service.registry().len().await,
            subscribers: state.change_bus.receiver_count(),
        }),
    )
}

/// Timing rules applied by the gateway and every viewer.
#[derive(Debug, Serialize, ToSchema)]
pub struct MatchRules {
    /// Half length used when a fixture is created without one.
    pub default_half_length_minutes: u32,
    /// Number of halves.
    pub halves: u8,
    /// Display minute rule for each half.
    pub display_minute: Vec<String>,
    /// Status lifecycle.
    pub statuses: Vec<&'static str>,
    /// Accepted admin actions.
    pub actions: Vec<&'static str>,
}

/// `GET /config/match-rules`: Match timing rules.
#[utoipa::path(
    get,
    path = "/config/match-rules",
    tag = "System",
    summary = "Match timing rules",
    description = "Returns the half length default, the display-minute rule, the status lifecycle and the admin actions.",
    responses(
        (status = 200, description = "Match rules", body = MatchRules),
    )
)]
pub async fn match_rules_handler(State(state): State<AppState>) -> impl IntoResponse {
    let half_length = state.fixture_service.default_half_length_minutes();
    let rules = MatchRules {
        default_half_length_minutes: half_length,
        halves: 2,
        display_minute: vec![
            "half 1: floor(elapsed / 60) + 1".to_string(),
            format!(
                "half 2: floor(elapsed / 60) + half_length + 1 ({} by default)",
                half_length.saturating_add(1)
            ),
        ],
        statuses: vec!["upcoming", "live", "completed"],
        actions: vec![
            "start",
            "half_time",
            "start_second_half",
            "end",
            "pause",
            "resume",
            "restart_timer",
            "record_goal",
            "override_score",
            "reset",
        ],
    };
    (StatusCode::OK, Json(rules))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/match-rules", get(match_rules_handler))
}
