//! Goal celebration trigger.
//!
//! Fires at most once per goal id per viewer. The first observation after
//! startup only primes the trigger so a viewer joining mid-match does not
//! celebrate a goal scored before it connected. Own goals never celebrate.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::{EventId, EventView};

/// Overlay instruction emitted by [`CelebrationTrigger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CelebrationSignal {
    /// Show the overlay for this goal.
    Show(EventView),
    /// Hide the overlay of this goal if it is still displayed.
    Hide(EventId),
}

/// Deduplicating celebration trigger with an auto-hide timer.
#[derive(Debug)]
pub struct CelebrationTrigger {
    hold: Duration,
    last_celebrated: Option<EventId>,
    primed: bool,
    current: Option<EventId>,
    timer: Option<JoinHandle<()>>,
    signals: mpsc::UnboundedSender<CelebrationSignal>,
}

impl CelebrationTrigger {
    /// Creates a trigger whose overlay stays up for `hold`, returning the
    /// receiving end of its signals.
    #[must_use]
    pub fn new(hold: Duration) -> (Self, mpsc::UnboundedReceiver<CelebrationSignal>) {
        let (signals, rx) = mpsc::unbounded_channel();
        let trigger = Self {
            hold,
            last_celebrated: None,
            primed: false,
            current: None,
            timer: None,
            signals,
        };
        (trigger, rx)
    }

    /// Records the goal present at startup without celebrating it.
    pub fn prime(&mut self, last_goal: Option<&EventView>) {
        self.last_celebrated = last_goal.map(|e| e.event.id);
        self.primed = true;
    }

    /// `true` once [`prime`](Self::prime) has run.
    #[must_use]
    pub const fn is_primed(&self) -> bool {
        self.primed
    }

    /// Goal whose overlay is currently displayed.
    #[must_use]
    pub const fn current(&self) -> Option<EventId> {
        self.current
    }

    /// Feeds the latest goal; returns `true` if a celebration started.
    ///
    /// A new celebration replaces a running one and restarts the hold
    /// timer. Must be called from within a Tokio runtime.
    pub fn observe(&mut self, last_goal: Option<&EventView>) -> bool {
        if !self.primed {
            self.prime(last_goal);
            return false;
        }
        let Some(goal) = last_goal else {
            return false;
        };
        if goal.scorer.is_none() || self.last_celebrated == Some(goal.event.id) {
            return false;
        }
        if goal.is_own_goal() {
            return false;
        }

        let id = goal.event.id;
        // Marked before signalling so a re-entrant observe cannot double fire.
        self.last_celebrated = Some(id);
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.current = Some(id);
        let _ = self.signals.send(CelebrationSignal::Show(goal.clone()));

        let signals = self.signals.clone();
        let hold = self.hold;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(hold).await;
            let _ = signals.send(CelebrationSignal::Hide(id));
        }));
        tracing::info!(event_id = %id, "goal celebration started");
        true
    }

    /// Clears the displayed overlay when `id` is still the current one.
    ///
    /// Returns `true` if the overlay was hidden.
    pub fn hide(&mut self, id: EventId) -> bool {
        if self.current != Some(id) {
            return false;
        }
        self.current = None;
        self.timer = None;
        true
    }
}

impl Drop for CelebrationTrigger {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
