//! Append-only match event rows.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::fixture::{Half, Side};
use super::ids::{EventId, MatchId, PlayerId};

/// Kind of match event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Regular goal.
    Goal,
    /// Goal credited to the opponents of the scorer's team.
    OwnGoal,
    /// Caution.
    YellowCard,
    /// Sending off.
    RedCard,
    /// Player change.
    Substitution,
}

impl EventKind {
    /// Returns the kind as its wire string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Goal => "goal",
            Self::OwnGoal => "own_goal",
            Self::YellowCard => "yellow_card",
            Self::RedCard => "red_card",
            Self::Substitution => "substitution",
        }
    }

    /// `true` for goals and own goals.
    #[must_use]
    pub const fn is_scoring(self) -> bool {
        matches!(self, Self::Goal | Self::OwnGoal)
    }
}

impl std::str::FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "goal" => Ok(Self::Goal),
            "own_goal" => Ok(Self::OwnGoal),
            "yellow_card" => Ok(Self::YellowCard),
            "red_card" => Ok(Self::RedCard),
            "substitution" => Ok(Self::Substitution),
            other => Err(format!("unknown event kind: {other}")),
        }
    }
}

/// Immutable record of something that happened in a fixture.
///
/// `minute` and `half` are fixed when the row is created from the clock at
/// that instant; they are never recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MatchEvent {
    /// Event identifier.
    pub id: EventId,
    /// Fixture the event belongs to.
    pub match_id: MatchId,
    /// What happened.
    pub kind: EventKind,
    /// Side credited with the event.
    pub side: Side,
    /// Scoring (or booked) player.
    pub scorer_id: Option<PlayerId>,
    /// Assisting player.
    pub assist_id: Option<PlayerId>,
    /// Display minute at creation.
    pub minute: u32,
    /// Half at creation.
    #[schema(value_type = u8, minimum = 1, maximum = 2)]
    pub half: Half,
    /// Per-fixture insertion counter, used as a stable tie-break.
    pub sequence: u64,
    /// Server timestamp of the insert.
    pub recorded_at: DateTime<Utc>,
}

impl MatchEvent {
    /// Feed order: highest minute first, ties broken by the later sequence.
    ///
    /// Arrival order is not used since minutes are derived on the writer's
    /// clock and notifications may arrive out of order.
    #[must_use]
    pub fn feed_order(&self, other: &Self) -> Ordering {
        other
            .minute
            .cmp(&self.minute)
            .then_with(|| other.sequence.cmp(&self.sequence))
            .then_with(|| self.id.cmp(&other.id))
    }
}
