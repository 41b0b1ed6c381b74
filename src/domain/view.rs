//! Denormalized read models shared by the REST API and the live feed client.
//!
//! A view is the authoritative row plus the display fields joined from the
//! [`super::roster::Roster`]. Change notifications carry only the row, so
//! clients merge a notification into a view by replacing the row and
//! keeping the joined fields.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::fixture::{Fixture, Side};
use super::match_event::{EventKind, MatchEvent};
use super::roster::{PlayerSummary, TeamSummary};

/// Fixture row with both sides' display fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FixtureView {
    /// Authoritative fixture row.
    #[serde(flatten)]
    pub fixture: Fixture,
    /// Side A display fields, `None` if the team is unknown.
    pub team_a: Option<TeamSummary>,
    /// Side B display fields, `None` if the team is unknown.
    pub team_b: Option<TeamSummary>,
}

impl FixtureView {
    /// Returns the display name of `side`, falling back to `"Side A"`/`"Side B"`.
    #[must_use]
    pub fn side_name(&self, side: Side) -> &str {
        let (team, fallback) = match side {
            Side::A => (&self.team_a, "Side A"),
            Side::B => (&self.team_b, "Side B"),
        };
        team.as_ref()
            .map(|t| t.short_name.as_deref().unwrap_or(t.name.as_str()))
            .unwrap_or(fallback)
    }
}

/// Event row with scorer, assist and team display fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EventView {
    /// Authoritative event row.
    #[serde(flatten)]
    pub event: MatchEvent,
    /// Scorer display fields, `None` if absent or unresolvable.
    pub scorer: Option<PlayerSummary>,
    /// Assist display fields.
    pub assist: Option<PlayerSummary>,
    /// Display fields of the credited side's team.
    pub team: Option<TeamSummary>,
}

impl EventView {
    /// `true` for goals and own goals.
    #[must_use]
    pub const fn is_scoring(&self) -> bool {
        self.event.kind.is_scoring()
    }

    /// `true` for own goals.
    #[must_use]
    pub fn is_own_goal(&self) -> bool {
        self.event.kind == EventKind::OwnGoal
    }
}

/// Fixture and its events read under a single lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LiveSnapshot {
    /// Fixture view.
    pub fixture: FixtureView,
    /// Events, most recent first.
    pub events: Vec<EventView>,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::ids::TeamId;
    use chrono::Utc;

    #[test]
    fn view_flattens_fixture_row() {
        let fixture = Fixture::new(TeamId::new(), TeamId::new(), None, 20, Utc::now());
        let view = FixtureView {
            team_a: Some(TeamSummary {
                id: fixture.side_a,
                name: "Harbour Rovers".to_string(),
                short_name: Some("HRV".to_string()),
                logo_url: None,
            }),
            team_b: None,
            fixture,
        };
        let Ok(json) = serde_json::to_value(&view) else {
            panic!("serialization failed");
        };
        assert_eq!(json["status"], "upcoming");
        assert_eq!(json["team_a"]["name"], "Harbour Rovers");

        let Ok(back) = serde_json::from_value::<FixtureView>(json) else {
            panic!("deserialization failed");
        };
        assert_eq!(back, view);
        assert_eq!(back.side_name(Side::A), "HRV");
        assert_eq!(back.side_name(Side::B), "Side B");
    }
}
