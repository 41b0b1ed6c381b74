//! Idempotent reducer behind every viewer.
//!
//! Push notifications and poll snapshots both land here. Fixture freshness
//! is decided by the row's `version`, which increases on every write and is
//! never reset; events are keyed by id. Feeding the same input twice, or an
//! older input after a newer one, leaves the state unchanged.

use crate::domain::{EventView, Fixture, FixtureView, LiveSnapshot, MatchId};

/// Cached, possibly stale copy of one fixture and its events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveState {
    match_id: MatchId,
    fixture: Option<FixtureView>,
    events: Vec<EventView>,
    deleted: bool,
}

impl LiveState {
    /// Empty state for `match_id`.
    #[must_use]
    pub const fn new(match_id: MatchId) -> Self {
        Self {
            match_id,
            fixture: None,
            events: Vec::new(),
            deleted: false,
        }
    }

    /// Fixture this state follows.
    #[must_use]
    pub const fn match_id(&self) -> MatchId {
        self.match_id
    }

    /// Current fixture view, if any input has arrived yet.
    #[must_use]
    pub const fn fixture(&self) -> Option<&FixtureView> {
        self.fixture.as_ref()
    }

    /// Events in feed order: minute descending, then insertion order
    /// descending.
    #[must_use]
    pub fn events(&self) -> &[EventView] {
        &self.events
    }

    /// `true` once the fixture has been deleted upstream.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Most recently recorded goal or own goal.
    ///
    /// Decided by `sequence`, not feed order: after a timer restart a new
    /// goal can carry a lower minute than one already on the feed.
    #[must_use]
    pub fn last_goal(&self) -> Option<&EventView> {
        self.events
            .iter()
            .filter(|e| e.is_scoring())
            .max_by_key(|e| e.event.sequence)
    }

    fn local_version(&self) -> Option<u64> {
        self.fixture.as_ref().map(|view| view.fixture.version)
    }

    /// Replaces fixture and events with an authoritative snapshot.
    ///
    /// Ignored when it belongs to another fixture or is older than the
    /// local version. Returns `true` if anything changed.
    pub fn apply_snapshot(&mut self, snapshot: LiveSnapshot) -> bool {
        if snapshot.fixture.fixture.id != self.match_id {
            return false;
        }
        if self
            .local_version()
            .is_some_and(|local| snapshot.fixture.fixture.version < local)
        {
            tracing::trace!(
                match_id = %self.match_id,
                version = snapshot.fixture.fixture.version,
                "ignoring stale snapshot"
            );
            return false;
        }

        let mut events = snapshot.events;
        sort_feed(&mut events);

        let changed = self.fixture.as_ref() != Some(&snapshot.fixture)
            || self.events != events
            || self.deleted;
        self.fixture = Some(snapshot.fixture);
        self.events = events;
        self.deleted = false;
        changed
    }

    /// Merges a pushed fixture row, keeping the joined display fields.
    ///
    /// Returns `true` if the row was newer and different.
    pub fn apply_fixture_row(&mut self, row: Fixture) -> bool {
        if row.id != self.match_id {
            return false;
        }
        match &mut self.fixture {
            None => {
                self.fixture = Some(FixtureView {
                    fixture: row,
                    team_a: None,
                    team_b: None,
                });
                true
            }
            Some(view) => {
                if row.version < view.fixture.version || row == view.fixture {
                    return false;
                }
                view.fixture = row;
                true
            }
        }
    }

    /// Inserts a fetched event unless it is already known.
    ///
    /// Returns `true` if the event was new.
    pub fn insert_event(&mut self, event: EventView) -> bool {
        if event.event.match_id != self.match_id
            || self.events.iter().any(|e| e.event.id == event.event.id)
        {
            return false;
        }
        self.events.push(event);
        sort_feed(&mut self.events);
        true
    }

    /// Drops every event after an administrative reset at `version`.
    ///
    /// Ignored when the local fixture is already newer than `version`.
    pub fn clear_events(&mut self, version: u64) -> bool {
        if self.local_version().is_some_and(|local| version < local) || self.events.is_empty() {
            return false;
        }
        self.events.clear();
        true
    }

    /// Marks the fixture as deleted upstream.
    pub fn mark_deleted(&mut self) -> bool {
        let changed = !self.deleted;
        self.deleted = true;
        changed
    }
}

fn sort_feed(events: &mut [EventView]) {
    events.sort_by(|a, b| a.event.feed_order(&b.event));
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{
        EventId, EventKind, Half, MatchEvent, PlayerSummary, PlayerId, Side, TeamId,
    };
    use chrono::Utc;

    fn fixture_view() -> FixtureView {
        FixtureView {
            fixture: Fixture::new(TeamId::new(), TeamId::new(), None, 20, Utc::now()),
            team_a: None,
            team_b: None,
        }
    }

    fn event(match_id: MatchId, minute: u32, sequence: u64, kind: EventKind) -> EventView {
        EventView {
            event: MatchEvent {
                id: EventId::new(),
                match_id,
                kind,
                side: Side::A,
                scorer_id: None,
                assist_id: None,
                minute,
                half: Half::First,
                sequence,
                recorded_at: Utc::now(),
            },
            scorer: Some(PlayerSummary {
                id: PlayerId::new(),
                team_id: TeamId::new(),
                name: "Scorer".to_string(),
                shirt_number: None,
            }),
            assist: None,
            team: None,
        }
    }

    fn snapshot(view: &FixtureView, events: Vec<EventView>) -> LiveSnapshot {
        LiveSnapshot {
            fixture: view.clone(),
            events,
        }
    }

    #[test]
    fn identical_snapshot_is_a_no_op() {
        let view = fixture_view();
        let id = view.fixture.id;
        let events = vec![event(id, 3, 1, EventKind::Goal), event(id, 9, 2, EventKind::Goal)];
        let mut state = LiveState::new(id);

        assert!(state.apply_snapshot(snapshot(&view, events.clone())));
        let before: Vec<EventId> = state.events().iter().map(|e| e.event.id).collect();

        assert!(!state.apply_snapshot(snapshot(&view, events)));
        let after: Vec<EventId> = state.events().iter().map(|e| e.event.id).collect();
        assert_eq!(before, after);
        assert_eq!(state.events().len(), 2);
    }

    #[test]
    fn events_sorted_by_minute_then_sequence() {
        let view = fixture_view();
        let id = view.fixture.id;
        let early = event(id, 3, 1, EventKind::Goal);
        let late_first = event(id, 12, 2, EventKind::YellowCard);
        let late_second = event(id, 12, 3, EventKind::Goal);
        let mut state = LiveState::new(id);
        let _ = state.apply_snapshot(snapshot(
            &view,
            vec![early.clone(), late_first.clone(), late_second.clone()],
        ));

        let order: Vec<EventId> = state.events().iter().map(|e| e.event.id).collect();
        assert_eq!(
            order,
            vec![late_second.event.id, late_first.event.id, early.event.id]
        );
        assert_eq!(state.last_goal().map(|e| e.event.id), Some(late_second.event.id));
    }

    #[test]
    fn last_goal_follows_sequence_after_timer_restart() {
        let view = fixture_view();
        let id = view.fixture.id;
        let before_restart = event(id, 16, 1, EventKind::Goal);
        let after_restart = event(id, 1, 2, EventKind::Goal);
        let mut state = LiveState::new(id);
        let _ = state.apply_snapshot(snapshot(&view, vec![before_restart.clone()]));
        assert!(state.insert_event(after_restart.clone()));

        let order: Vec<EventId> = state.events().iter().map(|e| e.event.id).collect();
        assert_eq!(order, vec![before_restart.event.id, after_restart.event.id]);
        assert_eq!(
            state.last_goal().map(|e| e.event.id),
            Some(after_restart.event.id)
        );
    }

    #[test]
    fn stale_snapshot_is_ignored() {
        let view = fixture_view();
        let id = view.fixture.id;
        let mut state = LiveState::new(id);
        let _ = state.apply_snapshot(snapshot(&view, Vec::new()));

        let mut newer = view.fixture.clone();
        newer.version = 3;
        newer.score_a = 2;
        assert!(state.apply_fixture_row(newer));

        assert!(!state.apply_snapshot(snapshot(&view, Vec::new())));
        assert_eq!(state.fixture().map(|v| v.fixture.score_a), Some(2));
    }

    #[test]
    fn pushed_row_keeps_joined_fields() {
        let mut view = fixture_view();
        view.team_a = Some(crate::domain::TeamSummary {
            id: view.fixture.side_a,
            name: "Harbour Rovers".to_string(),
            short_name: None,
            logo_url: None,
        });
        let id = view.fixture.id;
        let mut state = LiveState::new(id);
        let _ = state.apply_snapshot(snapshot(&view, Vec::new()));

        let mut row = view.fixture.clone();
        row.version = 2;
        row.score_b = 1;
        assert!(state.apply_fixture_row(row.clone()));
        assert!(!state.apply_fixture_row(row));

        let Some(current) = state.fixture() else {
            panic!("fixture missing");
        };
        assert_eq!(current.fixture.score_b, 1);
        assert_eq!(current.side_name(Side::A), "Harbour Rovers");
    }

    #[test]
    fn duplicate_event_insert_is_ignored() {
        let view = fixture_view();
        let id = view.fixture.id;
        let goal = event(id, 5, 1, EventKind::Goal);
        let mut state = LiveState::new(id);

        assert!(state.insert_event(goal.clone()));
        assert!(!state.insert_event(goal));
        assert_eq!(state.events().len(), 1);
    }

    #[test]
    fn foreign_inputs_are_ignored() {
        let view = fixture_view();
        let mut state = LiveState::new(MatchId::new());
        assert!(!state.apply_snapshot(snapshot(&view, Vec::new())));
        assert!(!state.apply_fixture_row(view.fixture.clone()));
        assert!(!state.insert_event(event(view.fixture.id, 1, 1, EventKind::Goal)));
        assert!(state.fixture().is_none());
    }

    #[test]
    fn reset_clears_only_when_not_stale() {
        let view = fixture_view();
        let id = view.fixture.id;
        let mut state = LiveState::new(id);
        let _ = state.apply_snapshot(snapshot(&view, vec![event(id, 2, 1, EventKind::OwnGoal)]));

        let mut newer = view.fixture.clone();
        newer.version = 5;
        let _ = state.apply_fixture_row(newer);
        assert!(!state.clear_events(4));
        assert!(state.clear_events(5));
        assert!(state.events().is_empty());
        assert!(state.last_goal().is_none());
    }

    #[test]
    fn deletion_is_reported_once() {
        let mut state = LiveState::new(MatchId::new());
        assert!(state.mark_deleted());
        assert!(!state.mark_deleted());
        assert!(state.is_deleted());
    }
}
