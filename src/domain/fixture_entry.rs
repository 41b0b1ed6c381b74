//! Registry entry combining a fixture row with its event rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::fixture::{Fixture, MatchStatus};
use super::ids::{MatchId, TeamId};
use super::match_event::MatchEvent;

/// Aggregate holding a fixture and its append-only events.
///
/// Both live behind the same per-fixture lock in
/// [`super::FixtureRegistry`], so a goal's score update and event insert
/// are applied together.
#[derive(Debug)]
pub struct FixtureEntry {
    /// The fixture row.
    pub fixture: Fixture,
    /// Event rows in insertion order.
    pub events: Vec<MatchEvent>,
    next_sequence: u64,
}

impl FixtureEntry {
    /// Wraps a freshly created fixture.
    #[must_use]
    pub const fn new(fixture: Fixture) -> Self {
        Self {
            fixture,
            events: Vec::new(),
            next_sequence: 1,
        }
    }

    /// Rebuilds an entry from persisted rows.
    #[must_use]
    pub fn restore(fixture: Fixture, mut events: Vec<MatchEvent>) -> Self {
        events.sort_by_key(|e| e.sequence);
        let next_sequence = events
            .last()
            .map_or(1, |e| e.sequence.saturating_add(1));
        Self {
            fixture,
            events,
            next_sequence,
        }
    }

    /// Reserves the next event sequence number.
    pub fn take_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.saturating_add(1);
        sequence
    }

    /// Events in feed order (most recent first).
    #[must_use]
    pub fn events_newest_first(&self) -> Vec<MatchEvent> {
        let mut events = self.events.clone();
        events.sort_by(MatchEvent::feed_order);
        events
    }
}

/// Lightweight summary of a fixture for list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FixtureSummary {
    /// Fixture identifier.
    pub id: MatchId,
    /// Side A team.
    pub side_a: TeamId,
    /// Side B team.
    pub side_b: TeamId,
    /// Lifecycle status.
    pub status: MatchStatus,
    /// Side A score.
    pub score_a: u32,
    /// Side B score.
    pub score_b: u32,
    /// Planned kickoff.
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Current version.
    pub version: u64,
}

impl From<&FixtureEntry> for FixtureSummary {
    fn from(entry: &FixtureEntry) -> Self {
        let f = &entry.fixture;
        Self {
            id: f.id,
            side_a: f.side_a,
            side_b: f.side_b,
            status: f.status,
            score_a: f.score_a,
            score_b: f.score_b,
            scheduled_at: f.scheduled_at,
            created_at: f.created_at,
            version: f.version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixture::{Half, Side};
    use crate::domain::ids::EventId;
    use crate::domain::match_event::EventKind;

    fn event(match_id: MatchId, sequence: u64) -> MatchEvent {
        MatchEvent {
            id: EventId::new(),
            match_id,
            kind: EventKind::Goal,
            side: Side::A,
            scorer_id: None,
            assist_id: None,
            minute: 5,
            half: Half::First,
            sequence,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn sequence_starts_at_one_and_increments() {
        let fixture = Fixture::new(TeamId::new(), TeamId::new(), None, 20, Utc::now());
        let mut entry = FixtureEntry::new(fixture);
        assert_eq!(entry.take_sequence(), 1);
        assert_eq!(entry.take_sequence(), 2);
    }

    #[test]
    fn restore_continues_after_highest_sequence() {
        let fixture = Fixture::new(TeamId::new(), TeamId::new(), None, 20, Utc::now());
        let id = fixture.id;
        let mut entry = FixtureEntry::restore(fixture, vec![event(id, 7), event(id, 2)]);
        assert_eq!(entry.take_sequence(), 8);
        assert_eq!(entry.events.first().map(|e| e.sequence), Some(2));
    }
}
