//! Teams and players, used to denormalize fixtures and events for display.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use utoipa::ToSchema;

use super::ids::{PlayerId, TeamId};
use crate::error::GatewayError;

/// A competing team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Team {
    /// Team identifier.
    pub id: TeamId,
    /// Display name.
    pub name: String,
    /// Abbreviation for scoreboards (e.g. `"RED"`).
    pub short_name: Option<String>,
    /// Logo image URL.
    pub logo_url: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A registered player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Player {
    /// Player identifier.
    pub id: PlayerId,
    /// Team the player belongs to.
    pub team_id: TeamId,
    /// Display name.
    pub name: String,
    /// Shirt number.
    pub shirt_number: Option<u16>,
}

/// Display fields of a team joined into fixture and event views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TeamSummary {
    /// Team identifier.
    pub id: TeamId,
    /// Display name.
    pub name: String,
    /// Abbreviation for scoreboards.
    pub short_name: Option<String>,
    /// Logo image URL.
    pub logo_url: Option<String>,
}

impl From<&Team> for TeamSummary {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id,
            name: team.name.clone(),
            short_name: team.short_name.clone(),
            logo_url: team.logo_url.clone(),
        }
    }
}

/// Display fields of a player joined into event views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PlayerSummary {
    /// Player identifier.
    pub id: PlayerId,
    /// Team the player belongs to.
    pub team_id: TeamId,
    /// Display name.
    pub name: String,
    /// Shirt number.
    pub shirt_number: Option<u16>,
}

impl From<&Player> for PlayerSummary {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id,
            team_id: player.team_id,
            name: player.name.clone(),
            shirt_number: player.shirt_number,
        }
    }
}

/// In-memory team and player directory.
#[derive(Debug, Default)]
pub struct Roster {
    teams: RwLock<HashMap<TeamId, Team>>,
    players: RwLock<HashMap<PlayerId, Player>>,
}

impl Roster {
    /// Creates an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a team.
    pub async fn upsert_team(&self, team: Team) {
        self.teams.write().await.insert(team.id, team);
    }

    /// Inserts or replaces a player.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::TeamNotFound`] if the player's team is not
    /// registered.
    pub async fn upsert_player(&self, player: Player) -> Result<(), GatewayError> {
        if !self.teams.read().await.contains_key(&player.team_id) {
            return Err(GatewayError::TeamNotFound(*player.team_id.as_uuid()));
        }
        self.players.write().await.insert(player.id, player);
        Ok(())
    }

    /// Returns a team by id.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::TeamNotFound`] if no such team exists.
    pub async fn team(&self, id: TeamId) -> Result<Team, GatewayError> {
        self.teams
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(GatewayError::TeamNotFound(*id.as_uuid()))
    }

    /// Returns all teams sorted by name.
    pub async fn teams(&self) -> Vec<Team> {
        let mut teams: Vec<Team> = self.teams.read().await.values().cloned().collect();
        teams.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        teams
    }

    /// Returns the players of `team` sorted by shirt number, then name.
    pub async fn players_of(&self, team: TeamId) -> Vec<Player> {
        let mut players: Vec<Player> = self
            .players
            .read()
            .await
            .values()
            .filter(|p| p.team_id == team)
            .cloned()
            .collect();
        players.sort_by(|a, b| {
            a.shirt_number
                .cmp(&b.shirt_number)
                .then_with(|| a.name.cmp(&b.name))
        });
        players
    }

    /// Looks up a team summary, `None` if unknown.
    pub async fn team_summary(&self, id: TeamId) -> Option<TeamSummary> {
        self.teams.read().await.get(&id).map(TeamSummary::from)
    }

    /// Looks up a player summary, `None` if unknown.
    pub async fn player_summary(&self, id: PlayerId) -> Option<PlayerSummary> {
        self.players.read().await.get(&id).map(PlayerSummary::from)
    }

    /// Returns a player by id.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PlayerNotFound`] if no such player exists.
    pub async fn player(&self, id: PlayerId) -> Result<Player, GatewayError> {
        self.players
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(GatewayError::PlayerNotFound(*id.as_uuid()))
    }
}
