//! Admin scorer: the writer surface.
//!
//! Every action is applied to a provisional copy of the confirmed fixture
//! first, so the operator sees the result immediately. The write carries the
//! confirmed `version`; on success the gateway's row becomes the confirmed
//! copy, on failure the provisional copy is dropped and the scorer
//! refreshes from the gateway.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use super::ClientError;
use super::source::{FixtureSource, ScoringBackend};
use crate::domain::{ClockReading, EventView, FixtureView, LiveSnapshot, MatchId, ScoringCommand};
use crate::service::ActionOutcome;

/// What the scorer UI renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScorerView {
    /// Provisional fixture while a write is in flight, confirmed otherwise.
    pub fixture: Option<FixtureView>,
    /// Confirmed events in feed order.
    pub events: Vec<EventView>,
    /// Command awaiting confirmation.
    pub pending: Option<ScoringCommand>,
    /// Message of the last failed action.
    pub last_error: Option<String>,
}

/// Writer surface bound to one selected fixture at a time.
#[derive(Debug)]
pub struct AdminScorer<B> {
    backend: Arc<B>,
    selected: Option<MatchId>,
    confirmed: Option<LiveSnapshot>,
    provisional: Option<FixtureView>,
    pending: Option<ScoringCommand>,
    last_error: Option<String>,
    view: watch::Sender<ScorerView>,
}

impl<B> AdminScorer<B>
where
    B: ScoringBackend + FixtureSource,
{
    /// Creates a scorer with nothing selected.
    #[must_use]
    pub fn new(backend: Arc<B>) -> Self {
        let (view, _) = watch::channel(ScorerView::default());
        Self {
            backend,
            selected: None,
            confirmed: None,
            provisional: None,
            pending: None,
            last_error: None,
            view,
        }
    }

    /// Receiver notified whenever the scorer view changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ScorerView> {
        self.view.subscribe()
    }

    /// Selected fixture.
    #[must_use]
    pub const fn selected(&self) -> Option<MatchId> {
        self.selected
    }

    /// Selects `match_id` and loads its state.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] if the initial fetch fails; the fixture
    /// stays selected so a later [`refresh`](Self::refresh) can recover.
    pub async fn select(&mut self, match_id: MatchId) -> Result<(), ClientError> {
        self.selected = Some(match_id);
        self.confirmed = None;
        self.provisional = None;
        self.pending = None;
        self.last_error = None;
        self.publish();
        self.refresh().await
    }

    /// Reloads the selected fixture, discarding any provisional state.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotSelected`] without a selection, or the
    /// fetch error.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let match_id = self.selected.ok_or(ClientError::NotSelected)?;
        let mut snapshot = self.backend.fetch_snapshot(match_id).await?;
        snapshot.events.sort_by(|a, b| a.event.feed_order(&b.event));
        self.confirmed = Some(snapshot);
        self.provisional = None;
        self.publish();
        Ok(())
    }

    /// Fixture as the operator sees it.
    #[must_use]
    pub fn fixture(&self) -> Option<&FixtureView> {
        self.provisional
            .as_ref()
            .or_else(|| self.confirmed.as_ref().map(|s| &s.fixture))
    }

    /// Confirmed events in feed order.
    #[must_use]
    pub fn events(&self) -> &[EventView] {
        self.confirmed.as_ref().map(|s| s.events.as_slice()).unwrap_or_default()
    }

    /// Reads the clock of the displayed fixture at `now`.
    #[must_use]
    pub fn clock(&self, now: DateTime<Utc>) -> Option<ClockReading> {
        self.fixture().map(|view| ClockReading::at(&view.fixture, now))
    }

    /// Applies `command` optimistically, then writes it to the gateway.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotSelected`] without a loaded fixture, a
    /// [`ClientError::Service`] if the command is invalid in the displayed
    /// state (nothing is sent), or the backend error after rolling back.
    pub async fn act(&mut self, command: ScoringCommand) -> Result<ActionOutcome, ClientError> {
        let match_id = self.selected.ok_or(ClientError::NotSelected)?;
        let confirmed = self.confirmed.as_ref().ok_or(ClientError::NotSelected)?;
        let expected_version = confirmed.fixture.fixture.version;

        let mut provisional = confirmed.fixture.clone();
        provisional.fixture.apply(&command, Utc::now())?;
        self.provisional = Some(provisional);
        self.pending = Some(command.clone());
        self.publish();

        let result = self
            .backend
            .apply(match_id, command.clone(), Some(expected_version))
            .await;
        self.provisional = None;
        self.pending = None;

        match result {
            Ok(outcome) => {
                self.confirm(&command, &outcome);
                self.last_error = None;
                self.publish();
                tracing::info!(
                    %match_id,
                    action = command.action_str(),
                    version = outcome.fixture.fixture.version,
                    "action confirmed"
                );
                Ok(outcome)
            }
            Err(e) => {
                tracing::warn!(
                    %match_id,
                    action = command.action_str(),
                    error = %e,
                    "action rejected, rolling back"
                );
                self.last_error = Some(e.to_string());
                self.publish();
                if let Err(refresh_err) = self.refresh().await {
                    tracing::warn!(
                        %match_id,
                        error = %refresh_err,
                        "refresh after rollback failed"
                    );
                }
                Err(e)
            }
        }
    }

    fn confirm(&mut self, command: &ScoringCommand, outcome: &ActionOutcome) {
        let Some(confirmed) = self.confirmed.as_mut() else {
            return;
        };
        confirmed.fixture = outcome.fixture.clone();
        if matches!(command, ScoringCommand::Reset) {
            confirmed.events.clear();
        }
        if let Some(event) = &outcome.event
            && !confirmed.events.iter().any(|e| e.event.id == event.event.id)
        {
            confirmed.events.push(event.clone());
            confirmed.events.sort_by(|a, b| a.event.feed_order(&b.event));
        }
    }

    fn publish(&self) {
        let next = ScorerView {
            fixture: self.fixture().cloned(),
            events: self.events().to_vec(),
            pending: self.pending.clone(),
            last_error: self.last_error.clone(),
        };
        self.view.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }
}
