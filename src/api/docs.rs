//! OpenAPI document and Swagger UI router.

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// Aggregated OpenAPI specification for the gateway.
#[derive(Debug, OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::system::health_handler,
        crate::api::handlers::system::match_rules_handler,
        crate::api::handlers::teams::create_team,
        crate::api::handlers::teams::list_teams,
        crate::api::handlers::teams::create_player,
        crate::api::handlers::teams::list_players,
        crate::api::handlers::fixtures::create_fixture,
        crate::api::handlers::fixtures::list_fixtures,
        crate::api::handlers::fixtures::get_fixture,
        crate::api::handlers::fixtures::delete_fixture,
        crate::api::handlers::fixtures::live_snapshot,
        crate::api::handlers::fixtures::list_events,
        crate::api::handlers::fixtures::clock,
        crate::api::handlers::scoring::apply_action,
        crate::api::handlers::events::get_event,
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::error::ErrorBody,
            crate::api::dto::CreateTeamRequest,
            crate::api::dto::CreatePlayerRequest,
            crate::api::dto::TeamListResponse,
            crate::api::dto::PlayerListResponse,
            crate::api::dto::CreateFixtureRequest,
            crate::api::dto::FixtureListResponse,
            crate::api::dto::EventListResponse,
            crate::api::dto::PaginationMeta,
            crate::api::dto::ActionRequest,
            crate::service::ActionOutcome,
            crate::domain::FixtureView,
            crate::domain::EventView,
            crate::domain::LiveSnapshot,
            crate::domain::ClockReading,
            crate::domain::ScoringCommand,
        )
    ),
    tags(
        (name = "System", description = "Health and match rules"),
        (name = "Teams", description = "Teams and players"),
        (name = "Fixtures", description = "Fixtures and live read models"),
        (name = "Scoring", description = "Admin actions"),
        (name = "Events", description = "Match events"),
    )
)]
pub struct ApiDoc;

/// Serves the Swagger UI backed by the generated OpenAPI document.
#[cfg(feature = "swagger-ui")]
pub fn router() -> Router<AppState> {
    use utoipa_swagger_ui::SwaggerUi;

    let ui: Router<AppState> = SwaggerUi::new("/docs")
        .url("/api-doc/openapi.json", ApiDoc::openapi())
        .into();
    ui
}

/// Serves only the raw OpenAPI document.
#[cfg(not(feature = "swagger-ui"))]
pub fn router() -> Router<AppState> {
    use axum::Json;
    use axum::routing::get;

    Router::new().route(
        "/api-doc/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}
