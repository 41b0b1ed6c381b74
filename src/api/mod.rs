//! REST API layer: route handlers, DTOs, OpenAPI docs, and router
//! composition.
//!
//! Resource endpoints are mounted under `/api/v1`; health, match rules and
//! docs live at the root.

pub mod docs;
pub mod dto;
pub mod handlers;

use axum::Router;

use crate::app_state::AppState;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
        .merge(docs::router())
}
