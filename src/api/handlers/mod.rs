//! REST endpoint handlers organized by resource.

pub mod events;
pub mod fixtures;
pub mod scoring;
pub mod system;
pub mod teams;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(teams::routes())
        .merge(fixtures::routes())
        .merge(scoring::routes())
        .merge(events::routes())
}
