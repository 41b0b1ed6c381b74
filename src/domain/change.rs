//! Row-level change notifications.
//!
//! Every write to a fixture or its event rows emits a
//! [`ChangeNotification`] through the [`super::ChangeBus`]. Notifications
//! mirror a database change feed: they name the table and the kind of
//! change and carry the row. Fixture updates carry the full row; event
//! inserts carry only a minimal `{id, match_id, kind}` record, so
//! subscribers fetch the denormalized event themselves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::fixture::Fixture;
use super::ids::MatchId;
use super::match_event::MatchEvent;

/// Table a notification refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    /// Fixture rows.
    Fixtures,
    /// Match event rows.
    Events,
}

/// Kind of row change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeKind {
    /// Row inserted.
    Insert,
    /// Row updated.
    Update,
    /// Row(s) deleted.
    Delete,
}

/// A row-level change, scoped to one fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeNotification {
    /// Table that changed.
    pub table: Table,
    /// Kind of change.
    pub change: ChangeKind,
    /// Fixture the change belongs to.
    pub match_id: MatchId,
    /// Fixture version after the change.
    pub version: u64,
    /// Changed row; shape depends on `table` and `change`.
    pub record: serde_json::Value,
    /// Server time of the change.
    pub commit_timestamp: DateTime<Utc>,
}

impl ChangeNotification {
    /// A fixture row was created.
    #[must_use]
    pub fn fixture_inserted(fixture: &Fixture) -> Self {
        Self::fixture_row(fixture, ChangeKind::Insert)
    }

    /// A fixture row was updated; `record` is the full row.
    #[must_use]
    pub fn fixture_updated(fixture: &Fixture) -> Self {
        Self::fixture_row(fixture, ChangeKind::Update)
    }

    /// A fixture row was deleted.
    #[must_use]
    pub fn fixture_deleted(fixture: &Fixture) -> Self {
        Self {
            table: Table::Fixtures,
            change: ChangeKind::Delete,
            match_id: fixture.id,
            version: fixture.version,
            record: serde_json::json!({ "id": fixture.id }),
            commit_timestamp: Utc::now(),
        }
    }

    /// An event row was inserted; `record` is minimal.
    #[must_use]
    pub fn event_inserted(event: &MatchEvent, version: u64) -> Self {
        Self {
            table: Table::Events,
            change: ChangeKind::Insert,
            match_id: event.match_id,
            version,
            record: serde_json::json!({
                "id": event.id,
                "match_id": event.match_id,
                "kind": event.kind,
            }),
            commit_timestamp: event.recorded_at,
        }
    }

    /// All event rows of a fixture were deleted (administrative reset).
    #[must_use]
    pub fn events_deleted(match_id: MatchId, version: u64) -> Self {
        Self {
            table: Table::Events,
            change: ChangeKind::Delete,
            match_id,
            version,
            record: serde_json::json!({ "match_id": match_id }),
            commit_timestamp: Utc::now(),
        }
    }

    fn fixture_row(fixture: &Fixture, change: ChangeKind) -> Self {
        Self {
            table: Table::Fixtures,
            change,
            match_id: fixture.id,
            version: fixture.version,
            record: serde_json::to_value(fixture).unwrap_or_default(),
            commit_timestamp: fixture.updated_at,
        }
    }

    /// Returns the notification type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match (self.table, self.change) {
            (Table::Fixtures, ChangeKind::Insert) => "fixture_inserted",
            (Table::Fixtures, ChangeKind::Update) => "fixture_updated",
            (Table::Fixtures, ChangeKind::Delete) => "fixture_deleted",
            (Table::Events, ChangeKind::Insert) => "event_inserted",
            (Table::Events, ChangeKind::Update) => "event_updated",
            (Table::Events, ChangeKind::Delete) => "events_deleted",
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::fixture::{Half, Side};
    use crate::domain::ids::{EventId, TeamId};
    use crate::domain::match_event::EventKind;

    #[test]
    fn fixture_update_carries_full_row() {
        let fixture = Fixture::new(TeamId::new(), TeamId::new(), None, 20, Utc::now());
        let note = ChangeNotification::fixture_updated(&fixture);
        assert_eq!(note.event_type_str(), "fixture_updated");
        assert_eq!(note.match_id, fixture.id);
        assert_eq!(note.record["half_length_minutes"], 20);
    }

    #[test]
    fn event_insert_record_is_minimal() {
        let event = MatchEvent {
            id: EventId::new(),
            match_id: crate::domain::MatchId::new(),
            kind: EventKind::Goal,
            side: Side::B,
            scorer_id: None,
            assist_id: None,
            minute: 12,
            half: Half::First,
            sequence: 1,
            recorded_at: Utc::now(),
        };
        let note = ChangeNotification::event_inserted(&event, 4);
        let Some(record) = note.record.as_object() else {
            panic!("record should be an object");
        };
        assert_eq!(record.len(), 3);
        assert_eq!(note.version, 4);
    }

    #[test]
    fn wire_format_uses_screaming_change_kind() {
        let note = ChangeNotification::events_deleted(crate::domain::MatchId::new(), 9);
        let Ok(json) = serde_json::to_value(&note) else {
            panic!("serialization failed");
        };
        assert_eq!(json["change"], "DELETE");
        assert_eq!(json["table"], "events");
    }
}
