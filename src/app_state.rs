//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::ChangeBus;
use crate::service::FixtureService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Fixture service for all business logic.
    pub fixture_service: Arc<FixtureService>,
    /// Change bus for WebSocket subscriptions.
    pub change_bus: ChangeBus,
}

impl AppState {
    /// Builds state around a service, sharing its change bus.
    #[must_use]
    pub fn new(fixture_service: Arc<FixtureService>) -> Self {
        let change_bus = fixture_service.change_bus().clone();
        Self {
            fixture_service,
            change_bus,
        }
    }
}
