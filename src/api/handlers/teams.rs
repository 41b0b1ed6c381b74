//! Team and player handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{CreatePlayerRequest, CreateTeamRequest, PlayerListResponse, TeamListResponse};
use crate::app_state::AppState;
use crate::domain::{Player, Team, TeamId};
use crate::error::{ErrorResponse, GatewayError};

/// `POST /teams`: Register a team.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for an empty name.
#[utoipa::path(
    post,
    path = "/api/v1/teams",
    tag = "Teams",
    summary = "Register a team",
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team created", body = Team),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    )
)]
pub async fn create_team(
    State(state): State<AppState>,
    Json(req): Json<CreateTeamRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let team = state
        .fixture_service
        .create_team(&req.name, req.short_name, req.logo_url)
        .await?;
    Ok((StatusCode::CREATED, Json(team)))
}

/// `GET /teams`: List teams.
#[utoipa::path(
    get,
    path = "/api/v1/teams",
    tag = "Teams",
    summary = "List teams",
    responses(
        (status = 200, description = "All teams sorted by name", body = TeamListResponse),
    )
)]
pub async fn list_teams(State(state): State<AppState>) -> impl IntoResponse {
    Json(TeamListResponse {
        data: state.fixture_service.list_teams().await,
    })
}

/// `POST /teams/{id}/players`: Register a player.
///
/// # Errors
///
/// Returns [`GatewayError::TeamNotFound`] if the team does not exist.
#[utoipa::path(
    post,
    path = "/api/v1/teams/{id}/players",
    tag = "Teams",
    summary = "Register a player",
    params(
        ("id" = uuid::Uuid, Path, description = "Team UUID"),
    ),
    request_body = CreatePlayerRequest,
    responses(
        (status = 201, description = "Player created", body = Player),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse),
    )
)]
pub async fn create_player(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<CreatePlayerRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let player = state
        .fixture_service
        .create_player(TeamId::from_uuid(id), &req.name, req.shirt_number)
        .await?;
    Ok((StatusCode::CREATED, Json(player)))
}

/// `GET /teams/{id}/players`: List a team's players.
///
/// # Errors
///
/// Returns [`GatewayError::TeamNotFound`] if the team does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/teams/{id}/players",
    tag = "Teams",
    summary = "List a team's players",
    params(
        ("id" = uuid::Uuid, Path, description = "Team UUID"),
    ),
    responses(
        (status = 200, description = "Players sorted by shirt number", body = PlayerListResponse),
        (status = 404, description = "Team not found", body = ErrorResponse),
    )
)]
pub async fn list_players(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let data = state
        .fixture_service
        .players_of(TeamId::from_uuid(id))
        .await?;
    Ok(Json(PlayerListResponse { data }))
}

/// Team and player routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/teams", post(create_team).get(list_teams))
        .route("/teams/{id}/players", post(create_player).get(list_players))
}
