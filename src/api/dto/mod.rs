//! Data Transfer Objects for REST request/response serialization.
//!
//! Responses reuse the domain views (`FixtureView`, `EventView`,
//! `LiveSnapshot`) directly; the types here cover request bodies, query
//! strings and list envelopes.

pub mod common_dto;
pub mod fixture_dto;
pub mod scoring_dto;
pub mod team_dto;

pub use common_dto::*;
pub use fixture_dto::*;
pub use scoring_dto::*;
pub use team_dto::*;
