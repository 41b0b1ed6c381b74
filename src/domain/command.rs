//! Admin scoring commands.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::fixture::Side;
use super::ids::PlayerId;

/// An authoritative write issued by the admin scorer.
///
/// Serialized with an `action` tag, e.g. `{"action":"half_time"}` or
/// `{"action":"record_goal","side":"a","scorer_id":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScoringCommand {
    /// Kick off the first half.
    Start,
    /// Call half time.
    HalfTime,
    /// Kick off the second half.
    StartSecondHalf,
    /// Final whistle.
    End,
    /// Stop the clock.
    Pause,
    /// Restart a stopped clock.
    Resume,
    /// Re-anchor the running half to now.
    RestartTimer,
    /// Credit a goal to `side` and append the matching event row.
    RecordGoal {
        /// Side credited with the goal.
        side: Side,
        /// Player who scored (for an own goal, the defending player).
        #[serde(default)]
        scorer_id: Option<PlayerId>,
        /// Assisting player.
        #[serde(default)]
        assist_id: Option<PlayerId>,
        /// Whether the goal was an own goal.
        #[serde(default)]
        own_goal: bool,
    },
    /// Administrative score correction; creates no event.
    OverrideScore {
        /// New score for side A.
        score_a: u32,
        /// New score for side B.
        score_b: u32,
    },
    /// Clear all anchors and delete every event of the fixture.
    Reset,
}

impl ScoringCommand {
    /// Returns the action tag as a static string slice.
    #[must_use]
    pub const fn action_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::HalfTime => "half_time",
            Self::StartSecondHalf => "start_second_half",
            Self::End => "end",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::RestartTimer => "restart_timer",
            Self::RecordGoal { .. } => "record_goal",
            Self::OverrideScore { .. } => "override_score",
            Self::Reset => "reset",
        }
    }
}
