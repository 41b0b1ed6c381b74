//! Broadcast channel for change notifications.
//!
//! [`ChangeBus`] wraps a [`tokio::sync::broadcast`] channel. Every write
//! publishes a [`ChangeNotification`] through the bus, and every WebSocket
//! connection (and in-process live feed) subscribes to receive them.

use tokio::sync::broadcast;

use super::ChangeNotification;

/// Broadcast bus for [`ChangeNotification`]s.
///
/// Backed by a `tokio::broadcast` channel with a configurable capacity.
/// When the ring buffer is full, the oldest notifications are dropped for
/// lagging receivers; viewers recover through polling.
#[derive(Debug, Clone)]
pub struct ChangeBus {
    sender: broadcast::Sender<ChangeNotification>,
}

impl ChangeBus {
    /// Creates a new `ChangeBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes a notification to all subscribers.
    ///
    /// Returns the number of receivers that received it. Without active
    /// receivers the notification is silently dropped.
    pub fn publish(&self, notification: ChangeNotification) -> usize {
        tracing::trace!(
            match_id = %notification.match_id,
            kind = notification.event_type_str(),
            version = notification.version,
            "publishing change"
        );
        self.sender.send(notification).unwrap_or(0)
    }

    /// Creates a new receiver that will receive all future notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeNotification> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
