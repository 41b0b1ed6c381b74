//! Concurrent fixture storage with per-fixture fine-grained locking.
//!
//! [`FixtureRegistry`] stores all fixtures in a `HashMap` where each entry
//! is individually protected by a [`tokio::sync::RwLock`]. Reads of the
//! same fixture run concurrently, writes to different fixtures run
//! concurrently, and writes to one fixture (score plus event insert
//! included) are serialized.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::fixture::MatchStatus;
use super::fixture_entry::{FixtureEntry, FixtureSummary};
use super::ids::{EventId, MatchId};
use crate::error::GatewayError;

/// Central store for all fixtures and their events.
///
/// Uses a `RwLock<HashMap<...>>` for the outer map and per-entry
/// `Arc<RwLock<FixtureEntry>>` for per-fixture locking. A secondary index
/// maps event ids to their fixture so events can be fetched by id alone.
#[derive(Debug, Default)]
pub struct FixtureRegistry {
    fixtures: RwLock<HashMap<MatchId, Arc<RwLock<FixtureEntry>>>>,
    event_index: RwLock<HashMap<EventId, MatchId>>,
}

impl FixtureRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fixture entry, indexing any events it already holds.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if a fixture with the same
    /// ID already exists.
    pub async fn insert(&self, entry: FixtureEntry) -> Result<MatchId, GatewayError> {
        let match_id = entry.fixture.id;
        let event_ids: Vec<EventId> = entry.events.iter().map(|e| e.id).collect();

        let mut map = self.fixtures.write().await;
        if map.contains_key(&match_id) {
            return Err(GatewayError::InvalidRequest(format!(
                "fixture {match_id} already exists"
            )));
        }
        map.insert(match_id, Arc::new(RwLock::new(entry)));
        drop(map);

        self.index_events(match_id, &event_ids).await;
        Ok(match_id)
    }

    /// Returns the entry behind its per-fixture lock.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::FixtureNotFound`] if no such fixture exists.
    pub async fn get(&self, match_id: MatchId) -> Result<Arc<RwLock<FixtureEntry>>, GatewayError> {
        let map = self.fixtures.read().await;
        map.get(&match_id)
            .cloned()
            .ok_or(GatewayError::FixtureNotFound(*match_id.as_uuid()))
    }

    /// Removes a fixture, returning its entry.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::FixtureNotFound`] if no such fixture exists,
    /// or [`GatewayError::Internal`] if the entry is still locked elsewhere.
    pub async fn remove(&self, match_id: MatchId) -> Result<FixtureEntry, GatewayError> {
        let mut map = self.fixtures.write().await;
        let arc = map
            .remove(&match_id)
            .ok_or(GatewayError::FixtureNotFound(*match_id.as_uuid()))?;
        drop(map);

        let entry = Arc::try_unwrap(arc)
            .map_err(|_| {
                GatewayError::Internal("fixture entry still referenced elsewhere".to_string())
            })?
            .into_inner();

        let event_ids: Vec<EventId> = entry.events.iter().map(|e| e.id).collect();
        self.unindex_events(&event_ids).await;
        Ok(entry)
    }

    /// Records which fixture the given events belong to.
    pub async fn index_events(&self, match_id: MatchId, event_ids: &[EventId]) {
        if event_ids.is_empty() {
            return;
        }
        let mut index = self.event_index.write().await;
        for id in event_ids {
            index.insert(*id, match_id);
        }
    }

    /// Forgets the given events.
    pub async fn unindex_events(&self, event_ids: &[EventId]) {
        if event_ids.is_empty() {
            return;
        }
        let mut index = self.event_index.write().await;
        for id in event_ids {
            index.remove(id);
        }
    }

    /// Returns the fixture an event belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::EventNotFound`] if the event is unknown.
    pub async fn locate_event(&self, event_id: EventId) -> Result<MatchId, GatewayError> {
        self.event_index
            .read()
            .await
            .get(&event_id)
            .copied()
            .ok_or(GatewayError::EventNotFound(*event_id.as_uuid()))
    }

    /// Returns summaries of all fixtures, optionally filtered by status,
    /// ordered by scheduled kickoff (unscheduled last), then creation time.
    pub async fn list(&self, status_filter: Option<MatchStatus>) -> Vec<FixtureSummary> {
        let map = self.fixtures.read().await;
        let mut summaries = Vec::with_capacity(map.len());
        for entry_lock in map.values() {
            let entry = entry_lock.read().await;
            if let Some(filter) = status_filter
                && entry.fixture.status != filter
            {
                continue;
            }
            summaries.push(FixtureSummary::from(&*entry));
        }
        drop(map);

        summaries.sort_by(|a, b| {
            let key_a = (a.scheduled_at.is_none(), a.scheduled_at, a.created_at);
            let key_b = (b.scheduled_at.is_none(), b.scheduled_at, b.created_at);
            key_a.cmp(&key_b).then(a.id.cmp(&b.id))
        });
        summaries
    }

    /// Returns the number of fixtures in the registry.
    pub async fn len(&self) -> usize {
        self.fixtures.read().await.len()
    }

    /// Returns `true` if the registry contains no fixtures.
    pub async fn is_empty(&self) -> bool {
        self.fixtures.read().await.is_empty()
    }
}
