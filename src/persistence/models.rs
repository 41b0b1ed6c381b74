//! Database row models and their conversions to domain types.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    EventKind, Fixture, Half, MatchEvent, MatchStatus, Player, Side, Team,
};
use crate::error::GatewayError;

/// A row from the `teams` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TeamRow {
    /// Primary key.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Scoreboard abbreviation.
    pub short_name: Option<String>,
    /// Logo URL.
    pub logo_url: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<TeamRow> for Team {
    fn from(row: TeamRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            short_name: row.short_name,
            logo_url: row.logo_url,
            created_at: row.created_at,
        }
    }
}

/// A row from the `players` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlayerRow {
    /// Primary key.
    pub id: Uuid,
    /// Owning team.
    pub team_id: Uuid,
    /// Display name.
    pub name: String,
    /// Shirt number.
    pub shirt_number: Option<i32>,
}

impl From<PlayerRow> for Player {
    fn from(row: PlayerRow) -> Self {
        Self {
            id: row.id.into(),
            team_id: row.team_id.into(),
            name: row.name,
            shirt_number: row.shirt_number.and_then(|n| u16::try_from(n).ok()),
        }
    }
}

/// A row from the `fixtures` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FixtureRow {
    /// Primary key.
    pub id: Uuid,
    /// Side A team.
    pub side_a: Uuid,
    /// Side B team.
    pub side_b: Uuid,
    /// `upcoming`, `live` or `completed`.
    pub status: String,
    /// Side A score.
    pub score_a: i32,
    /// Side B score.
    pub score_b: i32,
    /// Planned kickoff.
    pub scheduled_at: Option<DateTime<Utc>>,
    /// First-half kickoff.
    pub started_at: Option<DateTime<Utc>>,
    /// Half-time call.
    pub half_time_at: Option<DateTime<Utc>>,
    /// Second-half kickoff.
    pub second_half_started_at: Option<DateTime<Utc>>,
    /// Final whistle.
    pub ended_at: Option<DateTime<Utc>>,
    /// Completed pause seconds.
    pub paused_seconds: i64,
    /// Running pause start.
    pub paused_at: Option<DateTime<Utc>>,
    /// `1` or `2`.
    pub current_half: i16,
    /// Half length in minutes.
    pub half_length_minutes: i32,
    /// Write counter.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last write timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<FixtureRow> for Fixture {
    type Error = GatewayError;

    fn try_from(row: FixtureRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            side_a: row.side_a.into(),
            side_b: row.side_b.into(),
            status: row.status.parse::<MatchStatus>()?,
            score_a: non_negative(row.score_a),
            score_b: non_negative(row.score_b),
            scheduled_at: row.scheduled_at,
            started_at: row.started_at,
            half_time_at: row.half_time_at,
            second_half_started_at: row.second_half_started_at,
            ended_at: row.ended_at,
            paused_seconds: u64::try_from(row.paused_seconds).unwrap_or(0),
            paused_at: row.paused_at,
            current_half: parse_half(row.current_half)?,
            half_length_minutes: non_negative(row.half_length_minutes),
            version: u64::try_from(row.version).unwrap_or(0),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// A row from the `events` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRow {
    /// Primary key.
    pub id: Uuid,
    /// Owning fixture.
    pub match_id: Uuid,
    /// Event kind string.
    pub kind: String,
    /// `a` or `b`.
    pub side: String,
    /// Scorer.
    pub scorer_id: Option<Uuid>,
    /// Assist.
    pub assist_id: Option<Uuid>,
    /// Minute at creation.
    pub minute: i32,
    /// Half at creation.
    pub half: i16,
    /// Per-fixture insertion counter.
    pub sequence: i64,
    /// Insert timestamp.
    pub recorded_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for MatchEvent {
    type Error = GatewayError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            match_id: row.match_id.into(),
            kind: row
                .kind
                .parse::<EventKind>()
                .map_err(GatewayError::PersistenceError)?,
            side: parse_side(&row.side)?,
            scorer_id: row.scorer_id.map(Into::into),
            assist_id: row.assist_id.map(Into::into),
            minute: non_negative(row.minute),
            half: parse_half(row.half)?,
            sequence: u64::try_from(row.sequence).unwrap_or(0),
            recorded_at: row.recorded_at,
        })
    }
}

/// Converts a [`Side`] to its column value.
#[must_use]
pub const fn side_column(side: Side) -> &'static str {
    match side {
        Side::A => "a",
        Side::B => "b",
    }
}

fn parse_side(value: &str) -> Result<Side, GatewayError> {
    match value {
        "a" => Ok(Side::A),
        "b" => Ok(Side::B),
        other => Err(GatewayError::PersistenceError(format!(
            "invalid side column: {other}"
        ))),
    }
}

fn parse_half(value: i16) -> Result<Half, GatewayError> {
    u8::try_from(value)
        .map_err(|e| e.to_string())
        .and_then(Half::try_from)
        .map_err(GatewayError::PersistenceError)
}

fn non_negative(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}
