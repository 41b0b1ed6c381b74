//! Authoritative per-fixture state and its admin lifecycle.
//!
//! A [`Fixture`] is created `upcoming` with no timing anchors. Admin actions
//! populate the anchors progressively; the clock shown to viewers is always
//! re-derived from them (see [`super::clock`]) rather than stored.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::command::ScoringCommand;
use super::ids::{MatchId, TeamId};
use crate::error::GatewayError;

/// Half length used when a fixture does not specify one.
pub const DEFAULT_HALF_LENGTH_MINUTES: u32 = 20;

/// Lifecycle status of a fixture.
///
/// Moves `upcoming → live → completed`; only an administrative reset goes
/// back to `upcoming`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Scheduled, not started.
    Upcoming,
    /// In play (including the half-time break).
    Live,
    /// Finished.
    Completed,
}

impl MatchStatus {
    /// Returns the status as its wire string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Live => "live",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MatchStatus {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(Self::Upcoming),
            "live" => Ok(Self::Live),
            "completed" => Ok(Self::Completed),
            other => Err(GatewayError::InvalidRequest(format!(
                "unknown match status: {other}"
            ))),
        }
    }
}

/// One of the two ordered sides of a fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The first-listed side.
    A,
    /// The second-listed side.
    B,
}

impl Side {
    /// Returns the opposing side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

/// Playing period. Serialized as the integer `1` or `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Half {
    /// First half.
    First,
    /// Second half.
    Second,
}

impl Half {
    /// Returns `1` or `2`.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
        }
    }
}

impl From<Half> for u8 {
    fn from(half: Half) -> Self {
        half.number()
    }
}

impl TryFrom<u8> for Half {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::First),
            2 => Ok(Self::Second),
            other => Err(format!("half must be 1 or 2, got {other}")),
        }
    }
}

/// Authoritative per-fixture record.
///
/// Every successful mutation bumps [`Fixture::version`], which viewers use
/// as the freshness key when merging pushed and polled copies, and which
/// writers may pass back as an optimistic-lock token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Fixture {
    /// Fixture identifier.
    pub id: MatchId,
    /// First-listed team.
    pub side_a: TeamId,
    /// Second-listed team.
    pub side_b: TeamId,
    /// Lifecycle status.
    pub status: MatchStatus,
    /// Goals credited to side A.
    pub score_a: u32,
    /// Goals credited to side B.
    pub score_b: u32,
    /// Planned kickoff, informational only.
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Kickoff of the first half.
    pub started_at: Option<DateTime<Utc>>,
    /// When half time was called.
    pub half_time_at: Option<DateTime<Utc>>,
    /// Kickoff of the second half.
    pub second_half_started_at: Option<DateTime<Utc>>,
    /// Final whistle.
    pub ended_at: Option<DateTime<Utc>>,
    /// Seconds of completed pauses in the current half.
    pub paused_seconds: u64,
    /// Start of a pause that is still running.
    pub paused_at: Option<DateTime<Utc>>,
    /// Current playing period.
    #[schema(value_type = u8, minimum = 1, maximum = 2)]
    pub current_half: Half,
    /// Length of one half, used by the display minute.
    pub half_length_minutes: u32,
    /// Monotonic write counter; never reset.
    pub version: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last write.
    pub updated_at: DateTime<Utc>,
}

impl Fixture {
    /// Creates an `upcoming` fixture with no timing anchors.
    #[must_use]
    pub fn new(
        side_a: TeamId,
        side_b: TeamId,
        scheduled_at: Option<DateTime<Utc>>,
        half_length_minutes: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MatchId::new(),
            side_a,
            side_b,
            status: MatchStatus::Upcoming,
            score_a: 0,
            score_b: 0,
            scheduled_at,
            started_at: None,
            half_time_at: None,
            second_half_started_at: None,
            ended_at: None,
            paused_seconds: 0,
            paused_at: None,
            current_half: Half::First,
            half_length_minutes,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the team playing on `side`.
    #[must_use]
    pub const fn team(&self, side: Side) -> TeamId {
        match side {
            Side::A => self.side_a,
            Side::B => self.side_b,
        }
    }

    /// Returns the side `team` plays on, if it is part of this fixture.
    #[must_use]
    pub fn side_of(&self, team: TeamId) -> Option<Side> {
        if team == self.side_a {
            Some(Side::A)
        } else if team == self.side_b {
            Some(Side::B)
        } else {
            None
        }
    }

    /// `true` between the half-time call and the second-half kickoff.
    #[must_use]
    pub fn is_half_time_break(&self) -> bool {
        self.status == MatchStatus::Live
            && self.current_half == Half::First
            && self.half_time_at.is_some()
    }

    /// `true` while the clock advances with wall time.
    #[must_use]
    pub fn is_clock_running(&self) -> bool {
        self.status == MatchStatus::Live && !self.is_half_time_break() && self.paused_at.is_none()
    }

    /// Fails with [`GatewayError::VersionConflict`] when `expected` is set
    /// and does not match the current version.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::VersionConflict`] on mismatch.
    pub fn check_version(&self, expected: Option<u64>) -> Result<(), GatewayError> {
        match expected {
            Some(expected) if expected != self.version => Err(GatewayError::VersionConflict {
                expected,
                actual: self.version,
            }),
            _ => Ok(()),
        }
    }

    /// Applies an admin command to this fixture.
    ///
    /// Only the fixture row changes here; creating or deleting event rows is
    /// the caller's job.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidTransition`] when the command is not
    /// valid in the current state.
    pub fn apply(
        &mut self,
        command: &ScoringCommand,
        now: DateTime<Utc>,
    ) -> Result<(), GatewayError> {
        match command {
            ScoringCommand::Start => self.start(now),
            ScoringCommand::HalfTime => self.call_half_time(now),
            ScoringCommand::StartSecondHalf => self.start_second_half(now),
            ScoringCommand::End => self.end(now),
            ScoringCommand::Pause => self.pause(now),
            ScoringCommand::Resume => self.resume(now),
            ScoringCommand::RestartTimer => self.restart_timer(now),
            ScoringCommand::RecordGoal { side, .. } => self.credit_goal(*side, now),
            ScoringCommand::OverrideScore { score_a, score_b } => {
                self.override_score(*score_a, *score_b, now);
                Ok(())
            }
            ScoringCommand::Reset => {
                self.reset(now);
                Ok(())
            }
        }
    }

    /// Kicks off the first half.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidTransition`] unless the fixture is
    /// `upcoming`.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), GatewayError> {
        if self.status != MatchStatus::Upcoming {
            return Err(transition_error("start", self.status, "match already started"));
        }
        self.status = MatchStatus::Live;
        self.started_at = Some(now);
        self.current_half = Half::First;
        self.touch(now);
        Ok(())
    }

    /// Calls half time, freezing the first-half clock.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidTransition`] unless the first half is
    /// in play.
    pub fn call_half_time(&mut self, now: DateTime<Utc>) -> Result<(), GatewayError> {
        self.require_live("half time")?;
        if self.current_half != Half::First {
            return Err(transition_error("half time", self.status, "second half in play"));
        }
        if self.half_time_at.is_some() {
            return Err(transition_error("half time", self.status, "half time already called"));
        }
        self.fold_pause(now);
        self.half_time_at = Some(now);
        self.touch(now);
        Ok(())
    }

    /// Kicks off the second half. Pauses from the first half are discarded
    /// since the second half has its own anchor.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidTransition`] unless half time has been
    /// called and the second half has not started.
    pub fn start_second_half(&mut self, now: DateTime<Utc>) -> Result<(), GatewayError> {
        self.require_live("start second half")?;
        let Some(half_time_at) = self.half_time_at else {
            return Err(transition_error(
                "start second half",
                self.status,
                "half time not called",
            ));
        };
        if self.current_half == Half::Second {
            return Err(transition_error(
                "start second half",
                self.status,
                "second half already started",
            ));
        }
        self.current_half = Half::Second;
        self.second_half_started_at = Some(now.max(half_time_at));
        self.paused_seconds = 0;
        self.paused_at = None;
        self.touch(now);
        Ok(())
    }

    /// Blows the final whistle.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidTransition`] unless the fixture is
    /// `live`.
    pub fn end(&mut self, now: DateTime<Utc>) -> Result<(), GatewayError> {
        self.require_live("end")?;
        self.fold_pause(now);
        self.status = MatchStatus::Completed;
        self.ended_at = Some(now);
        self.touch(now);
        Ok(())
    }

    /// Stops the clock until [`Fixture::resume`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidTransition`] unless the clock is
    /// running.
    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<(), GatewayError> {
        self.require_live("pause")?;
        if !self.is_clock_running() {
            return Err(transition_error("pause", self.status, "clock is not running"));
        }
        self.paused_at = Some(now);
        self.touch(now);
        Ok(())
    }

    /// Restarts a paused clock, adding the pause to `paused_seconds`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidTransition`] unless the clock is paused.
    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<(), GatewayError> {
        self.require_live("resume")?;
        if self.paused_at.is_none() {
            return Err(transition_error("resume", self.status, "clock is not paused"));
        }
        self.fold_pause(now);
        self.touch(now);
        Ok(())
    }

    /// Re-anchors the running half to `now` and clears pauses.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidTransition`] when not live or during
    /// the half-time break.
    pub fn restart_timer(&mut self, now: DateTime<Utc>) -> Result<(), GatewayError> {
        self.require_live("restart timer")?;
        if self.is_half_time_break() {
            return Err(transition_error("restart timer", self.status, "half-time break"));
        }
        match self.current_half {
            Half::First => self.started_at = Some(now),
            Half::Second => self.second_half_started_at = Some(now),
        }
        self.paused_seconds = 0;
        self.paused_at = None;
        self.touch(now);
        Ok(())
    }

    /// Adds one goal to `side`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidTransition`] unless the fixture is
    /// `live`.
    pub fn credit_goal(&mut self, side: Side, now: DateTime<Utc>) -> Result<(), GatewayError> {
        self.require_live("record goal")?;
        match side {
            Side::A => self.score_a = self.score_a.saturating_add(1),
            Side::B => self.score_b = self.score_b.saturating_add(1),
        }
        self.touch(now);
        Ok(())
    }

    /// Administrative score correction, allowed in any state.
    pub fn override_score(&mut self, score_a: u32, score_b: u32, now: DateTime<Utc>) {
        self.score_a = score_a;
        self.score_b = score_b;
        self.touch(now);
    }

    /// Clears all anchors and the score, returning to `upcoming`.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.status = MatchStatus::Upcoming;
        self.score_a = 0;
        self.score_b = 0;
        self.started_at = None;
        self.half_time_at = None;
        self.second_half_started_at = None;
        self.ended_at = None;
        self.paused_seconds = 0;
        self.paused_at = None;
        self.current_half = Half::First;
        self.touch(now);
    }

    fn require_live(&self, action: &str) -> Result<(), GatewayError> {
        if self.status == MatchStatus::Live {
            Ok(())
        } else {
            Err(transition_error(action, self.status, "match is not live"))
        }
    }

    fn fold_pause(&mut self, now: DateTime<Utc>) {
        if let Some(paused_at) = self.paused_at.take() {
            let seconds = (now - paused_at).num_milliseconds().div_euclid(1000).max(0);
            self.paused_seconds = self
                .paused_seconds
                .saturating_add(u64::try_from(seconds).unwrap_or(0));
        }
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.version = self.version.saturating_add(1);
        self.updated_at = now;
    }
}

fn transition_error(action: &str, status: MatchStatus, reason: &str) -> GatewayError {
    GatewayError::InvalidTransition(format!("cannot {action} ({status}): {reason}"))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 15, 0, 0)
            .single()
            .unwrap_or_else(|| panic!("valid timestamp"))
    }

    fn fixture() -> Fixture {
        Fixture::new(TeamId::new(), TeamId::new(), None, 20, t0())
    }

    #[test]
    fn new_fixture_is_upcoming_without_anchors() {
        let f = fixture();
        assert_eq!(f.status, MatchStatus::Upcoming);
        assert!(f.started_at.is_none());
        assert_eq!(f.current_half, Half::First);
        assert_eq!(f.version, 1);
    }

    #[test]
    fn full_lifecycle_sets_anchors_in_order() {
        let mut f = fixture();
        assert!(f.start(t0()).is_ok());
        assert_eq!(f.status, MatchStatus::Live);

        let ht = t0() + Duration::minutes(20);
        assert!(f.call_half_time(ht).is_ok());
        assert!(f.is_half_time_break());

        let sh = ht + Duration::minutes(10);
        assert!(f.start_second_half(sh).is_ok());
        assert_eq!(f.current_half, Half::Second);
        assert!(f.second_half_started_at >= f.half_time_at);

        let end = sh + Duration::minutes(20);
        assert!(f.end(end).is_ok());
        assert_eq!(f.status, MatchStatus::Completed);
        assert_eq!(f.ended_at, Some(end));
        assert_eq!(f.version, 5);
    }

    #[test]
    fn second_half_requires_half_time() {
        let mut f = fixture();
        let _ = f.start(t0());
        let result = f.start_second_half(t0() + Duration::minutes(5));
        assert!(matches!(result, Err(GatewayError::InvalidTransition(_))));
        assert_eq!(f.current_half, Half::First);
    }

    #[test]
    fn cannot_start_twice() {
        let mut f = fixture();
        assert!(f.start(t0()).is_ok());
        assert!(f.start(t0()).is_err());
    }

    #[test]
    fn goals_only_while_live() {
        let mut f = fixture();
        assert!(f.credit_goal(Side::A, t0()).is_err());
        let _ = f.start(t0());
        assert!(f.credit_goal(Side::B, t0()).is_ok());
        assert_eq!((f.score_a, f.score_b), (0, 1));
    }

    #[test]
    fn pause_and_resume_accumulate_seconds() {
        let mut f = fixture();
        let _ = f.start(t0());
        assert!(f.pause(t0() + Duration::minutes(3)).is_ok());
        assert!(!f.is_clock_running());
        assert!(f.pause(t0() + Duration::minutes(4)).is_err());
        assert!(f.resume(t0() + Duration::minutes(5)).is_ok());
        assert_eq!(f.paused_seconds, 120);
        assert!(f.paused_at.is_none());
    }

    #[test]
    fn second_half_discards_first_half_pauses() {
        let mut f = fixture();
        let _ = f.start(t0());
        let _ = f.pause(t0() + Duration::minutes(1));
        let _ = f.resume(t0() + Duration::minutes(2));
        let _ = f.call_half_time(t0() + Duration::minutes(21));
        let _ = f.start_second_half(t0() + Duration::minutes(30));
        assert_eq!(f.paused_seconds, 0);
    }

    #[test]
    fn reset_clears_everything_but_keeps_version_monotonic() {
        let mut f = fixture();
        let _ = f.start(t0());
        let _ = f.credit_goal(Side::A, t0());
        let before = f.version;
        f.reset(t0() + Duration::minutes(1));
        assert_eq!(f.status, MatchStatus::Upcoming);
        assert_eq!((f.score_a, f.score_b), (0, 0));
        assert!(f.started_at.is_none());
        assert!(f.version > before);
    }

    #[test]
    fn check_version_detects_conflict() {
        let f = fixture();
        assert!(f.check_version(None).is_ok());
        assert!(f.check_version(Some(1)).is_ok());
        assert_eq!(
            f.check_version(Some(7)),
            Err(GatewayError::VersionConflict {
                expected: 7,
                actual: 1
            })
        );
    }

    #[test]
    fn restart_timer_reanchors_current_half() {
        let mut f = fixture();
        let _ = f.start(t0());
        let later = t0() + Duration::minutes(2);
        assert!(f.restart_timer(later).is_ok());
        assert_eq!(f.started_at, Some(later));
    }

    #[test]
    fn half_serializes_as_integer() {
        let Ok(json) = serde_json::to_string(&Half::Second) else {
            panic!("serialization failed");
        };
        assert_eq!(json, "2");
        assert!(serde_json::from_str::<Half>("3").is_err());
    }
}
