//! Fixture handlers: create, list, get, delete, and the live read models.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    CreateFixtureRequest, EventListResponse, FixtureListResponse, ListFixturesQuery,
};
use crate::app_state::AppState;
use crate::domain::{ClockReading, FixtureView, LiveSnapshot, MatchId};
use crate::error::{ErrorResponse, GatewayError};

/// `POST /fixtures`: Schedule a fixture.
///
/// # Errors
///
/// Returns [`GatewayError::TeamNotFound`] for an unknown team or
/// [`GatewayError::InvalidRequest`] for identical sides.
#[utoipa::path(
    post,
    path = "/api/v1/fixtures",
    tag = "Fixtures",
    summary = "Schedule a fixture",
    description = "Creates an `upcoming` fixture between two registered teams.",
    request_body = CreateFixtureRequest,
    responses(
        (status = 201, description = "Fixture created", body = FixtureView),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse),
    )
)]
pub async fn create_fixture(
    State(state): State<AppState>,
    Json(req): Json<CreateFixtureRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let view = state
        .fixture_service
        .create_fixture(req.side_a, req.side_b, req.scheduled_at, req.half_length_minutes)
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// `GET /fixtures`: List fixtures with pagination and optional status filter.
#[utoipa::path(
    get,
    path = "/api/v1/fixtures",
    tag = "Fixtures",
    summary = "List fixtures",
    description = "Returns a paginated list ordered by scheduled kickoff, optionally filtered by status.",
    params(ListFixturesQuery),
    responses(
        (status = 200, description = "Paginated fixture list", body = FixtureListResponse),
    )
)]
pub async fn list_fixtures(
    State(state): State<AppState>,
    Query(query): Query<ListFixturesQuery>,
) -> impl IntoResponse {
    let summaries = state.fixture_service.list_fixtures(query.status).await;
    let (data, pagination) = query.pagination().paginate(summaries);
    Json(FixtureListResponse { data, pagination })
}

/// `GET /fixtures/{id}`: Get a fixture with team display fields.
///
/// # Errors
///
/// Returns [`GatewayError::FixtureNotFound`] if the fixture does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/fixtures/{id}",
    tag = "Fixtures",
    summary = "Get fixture",
    params(
        ("id" = uuid::Uuid, Path, description = "Fixture UUID"),
    ),
    responses(
        (status = 200, description = "Fixture view", body = FixtureView),
        (status = 404, description = "Fixture not found", body = ErrorResponse),
    )
)]
pub async fn get_fixture(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let view = state
        .fixture_service
        .get_fixture(MatchId::from_uuid(id))
        .await?;
    Ok(Json(view))
}

/// `DELETE /fixtures/{id}`: Remove a fixture and its events.
///
/// # Errors
///
/// Returns [`GatewayError::FixtureNotFound`] if the fixture does not exist.
#[utoipa::path(
    delete,
    path = "/api/v1/fixtures/{id}",
    tag = "Fixtures",
    summary = "Delete fixture",
    params(
        ("id" = uuid::Uuid, Path, description = "Fixture UUID"),
    ),
    responses(
        (status = 204, description = "Fixture deleted"),
        (status = 404, description = "Fixture not found", body = ErrorResponse),
    )
)]
pub async fn delete_fixture(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    state
        .fixture_service
        .delete_fixture(MatchId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /fixtures/{id}/live`: Fixture and events in one consistent read.
///
/// # Errors
///
/// Returns [`GatewayError::FixtureNotFound`] if the fixture does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/fixtures/{id}/live",
    tag = "Fixtures",
    summary = "Live snapshot",
    description = "Returns the fixture view and its events (most recent first), read under one lock. Polled by viewers as the reconciliation source.",
    params(
        ("id" = uuid::Uuid, Path, description = "Fixture UUID"),
    ),
    responses(
        (status = 200, description = "Live snapshot", body = LiveSnapshot),
        (status = 404, description = "Fixture not found", body = ErrorResponse),
    )
)]
pub async fn live_snapshot(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let snapshot = state
        .fixture_service
        .live_snapshot(MatchId::from_uuid(id))
        .await?;
    Ok(Json(snapshot))
}

/// `GET /fixtures/{id}/events`: Events of a fixture.
///
/// # Errors
///
/// Returns [`GatewayError::FixtureNotFound`] if the fixture does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/fixtures/{id}/events",
    tag = "Fixtures",
    summary = "List fixture events",
    params(
        ("id" = uuid::Uuid, Path, description = "Fixture UUID"),
    ),
    responses(
        (status = 200, description = "Events, most recent first", body = EventListResponse),
        (status = 404, description = "Fixture not found", body = ErrorResponse),
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let data = state
        .fixture_service
        .events_of(MatchId::from_uuid(id))
        .await?;
    Ok(Json(EventListResponse { data }))
}

/// `GET /fixtures/{id}/clock`: Clock reading at server time.
///
/// # Errors
///
/// Returns [`GatewayError::FixtureNotFound`] if the fixture does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/fixtures/{id}/clock",
    tag = "Fixtures",
    summary = "Read the match clock",
    params(
        ("id" = uuid::Uuid, Path, description = "Fixture UUID"),
    ),
    responses(
        (status = 200, description = "Clock reading", body = ClockReading),
        (status = 404, description = "Fixture not found", body = ErrorResponse),
    )
)]
pub async fn clock(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let reading = state.fixture_service.clock(MatchId::from_uuid(id)).await?;
    Ok(Json(reading))
}

/// Fixture routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/fixtures", post(create_fixture).get(list_fixtures))
        .route("/fixtures/{id}", get(get_fixture).delete(delete_fixture))
        .route("/fixtures/{id}/live", get(live_snapshot))
        .route("/fixtures/{id}/events", get(list_events))
        .route("/fixtures/{id}/clock", get(clock))
}
