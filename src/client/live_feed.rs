//! Live feed session for one fixture.
//!
//! A [`LiveFeed`] owns three tasks:
//!
//! ```text
//!  push task ──(change stream, normalize, fetch event)──┐
//!                                                       ├─ mpsc ─> reducer task ─ watch ─> viewers
//!  poll task ──(snapshot every poll_interval)───────────┘             │
//!                                                          celebration trigger
//! ```
//!
//! The reducer is the only owner of [`LiveState`]. Push failures flip
//! `connected` to false and end the push task; polling keeps the view
//! converging. Dropping the feed aborts every task and the hide timer.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::celebration::{CelebrationSignal, CelebrationTrigger};
use super::payload::{FeedUpdate, normalize};
use super::reducer::LiveState;
use super::source::{ChangeSource, FixtureSource};
use crate::config::FeedConfig;
use crate::domain::{
    ClockReading, EventId, EventView, Fixture, FixtureView, LiveSnapshot, MatchId,
};

const INPUT_CHANNEL_CAPACITY: usize = 256;

/// What a viewer renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveView {
    /// Fixture followed by this feed.
    pub match_id: MatchId,
    /// Latest fixture view, `None` until the first input arrives.
    pub fixture: Option<FixtureView>,
    /// Events in feed order.
    pub events: Vec<EventView>,
    /// Most recent goal or own goal.
    pub last_goal: Option<EventView>,
    /// Whether the push subscription is up.
    pub connected: bool,
    /// Goal whose celebration overlay is displayed.
    pub celebrating: Option<EventView>,
    /// Number of celebrations started by this feed.
    pub celebrations: u64,
    /// Whether the fixture was deleted upstream.
    pub deleted: bool,
}

impl LiveView {
    fn empty(match_id: MatchId) -> Self {
        Self {
            match_id,
            fixture: None,
            events: Vec::new(),
            last_goal: None,
            connected: false,
            celebrating: None,
            celebrations: 0,
            deleted: false,
        }
    }

    /// Reads the clock at `now`, if the fixture is known.
    #[must_use]
    pub fn clock(&self, now: DateTime<Utc>) -> Option<ClockReading> {
        self.fixture
            .as_ref()
            .map(|view| ClockReading::at(&view.fixture, now))
    }
}

/// Tuning of a [`LiveFeed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedOptions {
    /// Snapshot polling period.
    pub poll_interval: Duration,
    /// How long a celebration overlay stays up.
    pub hold: Duration,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(3),
            hold: Duration::from_secs(10),
        }
    }
}

impl From<&FeedConfig> for FeedOptions {
    fn from(config: &FeedConfig) -> Self {
        Self {
            poll_interval: config.poll_interval,
            hold: config.celebration.hold(),
        }
    }
}

#[derive(Debug)]
enum FeedInput {
    Snapshot(Box<LiveSnapshot>),
    Row(Box<Fixture>),
    Deleted,
    Event(Box<EventView>),
    Cleared(u64),
    Connected(bool),
}

/// Running live feed for one fixture.
#[derive(Debug)]
pub struct LiveFeed {
    match_id: MatchId,
    view: watch::Receiver<LiveView>,
    tasks: Vec<JoinHandle<()>>,
}

impl LiveFeed {
    /// Starts the push, poll and reducer tasks for `match_id`.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn start<S, C>(
        source: Arc<S>,
        changes: Arc<C>,
        match_id: MatchId,
        options: FeedOptions,
    ) -> Self
    where
        S: FixtureSource,
        C: ChangeSource,
    {
        let (input_tx, input_rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        let (view_tx, view_rx) = watch::channel(LiveView::empty(match_id));

        let reducer = tokio::spawn(run_reducer(match_id, options.hold, input_rx, view_tx));
        let push = tokio::spawn(run_push(
            Arc::clone(&source),
            changes,
            match_id,
            input_tx.clone(),
        ));
        let poll = tokio::spawn(run_poll(source, match_id, options.poll_interval, input_tx));

        tracing::info!(%match_id, poll_ms = options.poll_interval.as_millis(), "live feed started");
        Self {
            match_id,
            view: view_rx,
            tasks: vec![push, poll, reducer],
        }
    }

    /// Fixture followed by this feed.
    #[must_use]
    pub const fn match_id(&self) -> MatchId {
        self.match_id
    }

    /// Current view.
    #[must_use]
    pub fn view(&self) -> LiveView {
        self.view.borrow().clone()
    }

    /// Receiver notified whenever the view changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LiveView> {
        self.view.clone()
    }

    /// Waits until the view satisfies `predicate`.
    ///
    /// Returns `None` if the reducer stopped first.
    pub async fn wait_for(&self, predicate: impl FnMut(&LiveView) -> bool) -> Option<LiveView> {
        let mut rx = self.view.clone();
        rx.wait_for(predicate).await.ok().map(|view| view.clone())
    }

    /// Stops every task of the feed.
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for LiveFeed {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
        tracing::debug!(match_id = %self.match_id, "live feed stopped");
    }
}

async fn run_push<S, C>(
    source: Arc<S>,
    changes: Arc<C>,
    match_id: MatchId,
    tx: mpsc::Sender<FeedInput>,
) where
    S: FixtureSource,
    C: ChangeSource,
{
    let mut stream = match changes.subscribe(match_id).await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!(%match_id, error = %e, "change subscription failed");
            let _ = tx.send(FeedInput::Connected(false)).await;
            return;
        }
    };
    if tx.send(FeedInput::Connected(true)).await.is_err() {
        return;
    }

    while let Some(item) = stream.next().await {
        let notification = match item {
            Ok(notification) => notification,
            Err(e) => {
                tracing::warn!(%match_id, error = %e, "change subscription broke");
                break;
            }
        };
        let input = match normalize(&notification) {
            Ok(FeedUpdate::FixtureRow(row)) => FeedInput::Row(row),
            Ok(FeedUpdate::FixtureDeleted(_)) => FeedInput::Deleted,
            Ok(FeedUpdate::EventsCleared { version }) => FeedInput::Cleared(version),
            Ok(FeedUpdate::EventAdded { event_id, .. }) => {
                match source.fetch_event(event_id).await {
                    Ok(event) => FeedInput::Event(Box::new(event)),
                    Err(e) => {
                        tracing::warn!(%match_id, %event_id, error = %e, "event fetch failed");
                        continue;
                    }
                }
            }
            Err(e) => {
                tracing::warn!(%match_id, error = %e, "dropping malformed notification");
                continue;
            }
        };
        if tx.send(input).await.is_err() {
            return;
        }
    }

    let _ = tx.send(FeedInput::Connected(false)).await;
}

async fn run_poll<S>(
    source: Arc<S>,
    match_id: MatchId,
    period: Duration,
    tx: mpsc::Sender<FeedInput>,
) where
    S: FixtureSource,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let input = match source.fetch_snapshot(match_id).await {
            Ok(snapshot) => FeedInput::Snapshot(Box::new(snapshot)),
            Err(e) if e.is_fixture_missing() => FeedInput::Deleted,
            Err(e) => {
                tracing::warn!(%match_id, error = %e, "snapshot poll failed");
                continue;
            }
        };
        if tx.send(input).await.is_err() {
            return;
        }
    }
}

async fn run_reducer(
    match_id: MatchId,
    hold: Duration,
    mut inputs: mpsc::Receiver<FeedInput>,
    view_tx: watch::Sender<LiveView>,
) {
    let mut state = LiveState::new(match_id);
    let (mut trigger, mut signals) = CelebrationTrigger::new(hold);
    let mut view = LiveView::empty(match_id);
    // Goals pushed before the first snapshot; they happened while this
    // viewer was watching and stay eligible for a celebration.
    let mut pushed_early: Vec<EventId> = Vec::new();

    loop {
        tokio::select! {
            input = inputs.recv() => {
                let Some(input) = input else { break };
                let first_snapshot =
                    matches!(input, FeedInput::Snapshot(_)) && !trigger.is_primed();
                if let FeedInput::Event(event) = &input
                    && event.is_scoring()
                    && !trigger.is_primed()
                {
                    pushed_early.push(event.event.id);
                }
                let changed = reduce(&mut state, &mut view, input);
                if first_snapshot {
                    trigger.prime(historical_goal(&state, &pushed_early));
                    pushed_early.clear();
                    let _ = trigger.observe(state.last_goal());
                } else if changed && trigger.is_primed() {
                    let _ = trigger.observe(state.last_goal());
                }
                if !changed {
                    continue;
                }
            }
            Some(signal) = signals.recv() => match signal {
                CelebrationSignal::Show(goal) => {
                    view.celebrating = Some(goal);
                    view.celebrations += 1;
                }
                CelebrationSignal::Hide(id) => {
                    if !trigger.hide(id) {
                        continue;
                    }
                    view.celebrating = None;
                }
            },
        }

        view.fixture = state.fixture().cloned();
        view.events = state.events().to_vec();
        view.last_goal = state.last_goal().cloned();
        view.deleted = state.is_deleted();
        let next = view.clone();
        view_tx.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }
}

/// Latest goal the viewer did not witness live.
fn historical_goal<'a>(state: &'a LiveState, pushed_early: &[EventId]) -> Option<&'a EventView> {
    state
        .events()
        .iter()
        .filter(|e| e.is_scoring() && !pushed_early.contains(&e.event.id))
        .max_by_key(|e| e.event.sequence)
}

/// Applies one input; returns `true` if the view may have changed.
fn reduce(state: &mut LiveState, view: &mut LiveView, input: FeedInput) -> bool {
    match input {
        FeedInput::Snapshot(snapshot) => state.apply_snapshot(*snapshot),
        FeedInput::Row(row) => state.apply_fixture_row(*row),
        FeedInput::Deleted => state.mark_deleted(),
        FeedInput::Event(event) => state.insert_event(*event),
        FeedInput::Cleared(version) => state.clear_events(version),
        FeedInput::Connected(connected) => {
            let changed = view.connected != connected;
            view.connected = connected;
            changed
        }
    }
}
