//! Normalization of raw change notifications into typed feed updates.
//!
//! Fixture notifications carry the full row; event inserts carry only the
//! event id, so the caller resolves the full event before it reaches the
//! reducer.

use serde::Deserialize;

use super::ClientError;
use crate::domain::{ChangeKind, ChangeNotification, EventId, Fixture, MatchId, Table};

/// A change notification reduced to what the live state needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedUpdate {
    /// Fixture row inserted or updated.
    FixtureRow(Box<Fixture>),
    /// Fixture deleted.
    FixtureDeleted(MatchId),
    /// An event row appeared and must be fetched by id.
    EventAdded {
        /// Event to fetch.
        event_id: EventId,
        /// Fixture version after the insert.
        version: u64,
    },
    /// All event rows of the fixture were deleted.
    EventsCleared {
        /// Fixture version after the reset.
        version: u64,
    },
}

#[derive(Deserialize)]
struct EventRecord {
    id: EventId,
}

/// Normalizes `notification`.
///
/// # Errors
///
/// Returns [`ClientError::Decode`] when the record does not match its
/// table, or [`ClientError::Malformed`] for an event row missing its id.
pub fn normalize(notification: &ChangeNotification) -> Result<FeedUpdate, ClientError> {
    match (notification.table, notification.change) {
        (Table::Fixtures, ChangeKind::Insert | ChangeKind::Update) => {
            let fixture: Fixture = serde_json::from_value(notification.record.clone())?;
            Ok(FeedUpdate::FixtureRow(Box::new(fixture)))
        }
        (Table::Fixtures, ChangeKind::Delete) => {
            Ok(FeedUpdate::FixtureDeleted(notification.match_id))
        }
        (Table::Events, ChangeKind::Insert | ChangeKind::Update) => {
            let record = EventRecord::deserialize(&notification.record).map_err(|_| {
                ClientError::Malformed(format!(
                    "event record without id: {}",
                    notification.record
                ))
            })?;
            Ok(FeedUpdate::EventAdded {
                event_id: record.id,
                version: notification.version,
            })
        }
        (Table::Events, ChangeKind::Delete) => Ok(FeedUpdate::EventsCleared {
            version: notification.version,
        }),
    }
}
