//! In-process gateway adapter over [`FixtureService`].
//!
//! Lets the live feed and the admin scorer run inside the gateway process
//! (and in tests) without a network hop.

use std::sync::Arc;

use tokio::sync::broadcast;

use super::ClientError;
use super::source::{ChangeSource, ChangeStream, FixtureSource, ScoringBackend};
use crate::domain::{EventId, EventView, LiveSnapshot, MatchId, ScoringCommand};
use crate::service::{ActionOutcome, FixtureService};

/// Reads, writes and subscribes directly against a [`FixtureService`].
#[derive(Debug, Clone)]
pub struct LocalGateway {
    service: Arc<FixtureService>,
}

impl LocalGateway {
    /// Wraps a shared service.
    #[must_use]
    pub const fn new(service: Arc<FixtureService>) -> Self {
        Self { service }
    }
}

impl FixtureSource for LocalGateway {
    async fn fetch_snapshot(&self, match_id: MatchId) -> Result<LiveSnapshot, ClientError> {
        Ok(self.service.live_snapshot(match_id).await?)
    }

    async fn fetch_event(&self, event_id: EventId) -> Result<EventView, ClientError> {
        Ok(self.service.get_event(event_id).await?)
    }
}

impl ScoringBackend for LocalGateway {
    async fn apply(
        &self,
        match_id: MatchId,
        command: ScoringCommand,
        expected_version: Option<u64>,
    ) -> Result<ActionOutcome, ClientError> {
        Ok(self
            .service
            .apply(match_id, command, expected_version)
            .await?)
    }
}

impl ChangeSource for LocalGateway {
    async fn subscribe(&self, match_id: MatchId) -> Result<ChangeStream, ClientError> {
        let rx = self.service.change_bus().subscribe();
        let stream = futures_util::stream::unfold(rx, move |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(notification) if notification.match_id == match_id => {
                        return Some((Ok(notification), rx));
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(%match_id, lagged = n, "live feed lagged behind change bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        });
        Ok(Box::pin(stream))
    }
}
