//! Service layer: business logic orchestration.
//!
//! [`FixtureService`] coordinates roster, fixture and scoring operations,
//! writes them through to persistence, and emits change notifications
//! through the [`super::domain::ChangeBus`].

pub mod fixture_service;

pub use fixture_service::{ActionOutcome, FixtureService};
