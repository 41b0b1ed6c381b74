//! Event lookup handler.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::app_state::AppState;
use crate::domain::{EventId, EventView};
use crate::error::{ErrorResponse, GatewayError};

/// `GET /events/{id}`: One denormalized event.
///
/// Change notifications for event inserts carry only `{id, match_id, kind}`;
/// viewers resolve the full event here.
///
/// # Errors
///
/// Returns [`GatewayError::EventNotFound`] if the event does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}",
    tag = "Events",
    summary = "Get event",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Event with scorer, assist and team", body = EventView),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let view = state
        .fixture_service
        .get_event(EventId::from_uuid(id))
        .await?;
    Ok(Json(view))
}

/// Event routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/events/{id}", get(get_event))
}
