//! Fixture DTOs for create, list and event endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::{PaginationMeta, PaginationParams};
use crate::domain::{EventView, FixtureSummary, MatchStatus, TeamId};

/// Request body for `POST /fixtures`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateFixtureRequest {
    /// Team playing as side A.
    pub side_a: TeamId,
    /// Team playing as side B.
    pub side_b: TeamId,
    /// Planned kickoff.
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Minutes per half; the gateway default applies when omitted.
    #[serde(default)]
    pub half_length_minutes: Option<u32>,
}

/// Query parameters for `GET /fixtures`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListFixturesQuery {
    /// Only fixtures in this status.
    #[serde(default)]
    pub status: Option<MatchStatus>,
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default)]
    pub page: Option<u32>,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default)]
    pub per_page: Option<u32>,
}

impl ListFixturesQuery {
    /// Pagination part of the query, with defaults applied.
    #[must_use]
    pub fn pagination(&self) -> PaginationParams {
        let defaults = PaginationParams::default();
        PaginationParams {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// Paginated list response for `GET /fixtures`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FixtureListResponse {
    /// Fixture summaries for the requested page.
    pub data: Vec<FixtureSummary>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Response body for `GET /fixtures/{id}/events`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventListResponse {
    /// Events, most recent first.
    pub data: Vec<EventView>,
}
