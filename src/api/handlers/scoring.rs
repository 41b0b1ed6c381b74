//! Admin scoring handler.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::ActionRequest;
use crate::app_state::AppState;
use crate::domain::MatchId;
use crate::error::{ErrorResponse, GatewayError};
use crate::service::ActionOutcome;

/// `POST /fixtures/{id}/actions`: Apply an admin action.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidTransition`] or
/// [`GatewayError::VersionConflict`] (409), [`GatewayError::FixtureNotFound`]
/// or [`GatewayError::PlayerNotFound`] (404).
#[utoipa::path(
    post,
    path = "/api/v1/fixtures/{id}/actions",
    tag = "Scoring",
    summary = "Apply an admin action",
    description = "Start, half time, second half, end, pause, resume, restart timer, record goal, override score or reset. `record_goal` updates the score and appends the event atomically. Set `expected_version` to reject the write if the fixture changed since it was read.",
    params(
        ("id" = uuid::Uuid, Path, description = "Fixture UUID"),
    ),
    request_body = ActionRequest,
    responses(
        (status = 200, description = "Action applied", body = ActionOutcome),
        (status = 404, description = "Fixture or player not found", body = ErrorResponse),
        (status = 409, description = "Invalid transition or version conflict", body = ErrorResponse),
    )
)]
pub async fn apply_action(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<ActionRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let outcome = state
        .fixture_service
        .apply(MatchId::from_uuid(id), req.command, req.expected_version)
        .await?;
    Ok(Json(outcome))
}

/// Scoring routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/fixtures/{id}/actions", post(apply_action))
}
