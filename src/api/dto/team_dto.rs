//! Team and player DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Player, Team};

/// Request body for `POST /teams`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateTeamRequest {
    /// Display name.
    pub name: String,
    /// Scoreboard abbreviation.
    #[serde(default)]
    pub short_name: Option<String>,
    /// Logo image URL.
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// Request body for `POST /teams/{id}/players`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePlayerRequest {
    /// Display name.
    pub name: String,
    /// Shirt number.
    #[serde(default)]
    pub shirt_number: Option<u16>,
}

/// Response body for `GET /teams`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamListResponse {
    /// All teams sorted by name.
    pub data: Vec<Team>,
}

/// Response body for `GET /teams/{id}/players`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlayerListResponse {
    /// Players sorted by shirt number, then name.
    pub data: Vec<Player>,
}
