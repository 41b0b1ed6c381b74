//! Match clock derivation.
//!
//! The clock is never stored. Every viewer re-derives it from the fixture's
//! timing anchors and its own "now", typically once per second. All
//! functions here are pure.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::fixture::{Fixture, Half};

/// Seconds of play in the current half, never negative.
///
/// - No kickoff yet: `0`.
/// - Anchor: second-half kickoff when in the second half, else first-half
///   kickoff.
/// - Bound: final whistle if set; else the half-time call while the second
///   half has not started (the clock freezes); else `now`.
/// - Completed pauses and any pause still running are subtracted.
#[must_use]
pub fn elapsed_seconds(fixture: &Fixture, now: DateTime<Utc>) -> u64 {
    let Some(started_at) = fixture.started_at else {
        return 0;
    };

    let anchor = match (fixture.current_half, fixture.second_half_started_at) {
        (Half::Second, Some(second_half)) => second_half,
        _ => started_at,
    };

    let bound = if let Some(ended_at) = fixture.ended_at {
        ended_at
    } else if let (Some(half_time_at), Half::First) = (fixture.half_time_at, fixture.current_half)
    {
        half_time_at
    } else {
        now
    };

    let running_pause = fixture
        .paused_at
        .map_or(0, |paused_at| whole_seconds(bound - paused_at).max(0));
    let paused = i64::try_from(fixture.paused_seconds).unwrap_or(i64::MAX);

    let elapsed = whole_seconds(bound - anchor)
        .saturating_sub(paused)
        .saturating_sub(running_pause);
    u64::try_from(elapsed).unwrap_or(0)
}

/// Minute shown to viewers: `elapsed / 60 + 1` in the first half and
/// `elapsed / 60 + half_length + 1` in the second.
#[must_use]
pub fn display_minute(fixture: &Fixture, now: DateTime<Utc>) -> u32 {
    let minutes = u32::try_from(elapsed_seconds(fixture, now) / 60).unwrap_or(u32::MAX);
    let offset = match fixture.current_half {
        Half::First => 1,
        Half::Second => fixture.half_length_minutes.saturating_add(1),
    };
    minutes.saturating_add(offset)
}

/// Formats elapsed seconds as `MM:SS`.
#[must_use]
pub fn format_elapsed(elapsed_seconds: u64) -> String {
    format!("{:02}:{:02}", elapsed_seconds / 60, elapsed_seconds % 60)
}

/// Point-in-time reading of a fixture's clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClockReading {
    /// Seconds of play in the current half.
    pub elapsed_seconds: u64,
    /// Minute shown to viewers.
    pub display_minute: u32,
    /// Current half as `1` or `2`.
    pub half: u8,
    /// Whether the clock advances with wall time.
    pub running: bool,
    /// `MM:SS` rendering of `elapsed_seconds`.
    pub formatted: String,
}

impl ClockReading {
    /// Reads the clock of `fixture` at `now`.
    #[must_use]
    pub fn at(fixture: &Fixture, now: DateTime<Utc>) -> Self {
        let elapsed = elapsed_seconds(fixture, now);
        Self {
            elapsed_seconds: elapsed,
            display_minute: display_minute(fixture, now),
            half: fixture.current_half.number(),
            running: fixture.is_clock_running(),
            formatted: format_elapsed(elapsed),
        }
    }
}

fn whole_seconds(delta: TimeDelta) -> i64 {
    delta.num_milliseconds().div_euclid(1000)
}
