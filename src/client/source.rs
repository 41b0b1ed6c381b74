//! Seams between the live feed and the gateway it reads from.
//!
//! The feed is generic over these traits so the same reducer runs against
//! the HTTP/WebSocket gateway ([`super::HttpGateway`],
//! [`super::WsChangeSource`]) or an in-process service
//! ([`super::LocalGateway`]).

use std::future::Future;
use std::pin::Pin;

use futures_util::Stream;

use super::ClientError;
use crate::domain::{ChangeNotification, EventId, EventView, LiveSnapshot, MatchId, ScoringCommand};
use crate::service::ActionOutcome;

/// Stream of change notifications for one fixture.
pub type ChangeStream = Pin<Box<dyn Stream<Item = Result<ChangeNotification, ClientError>> + Send>>;

/// Request/response reads of authoritative state.
pub trait FixtureSource: Send + Sync + 'static {
    /// Fetches the fixture and its events in one consistent read.
    fn fetch_snapshot(
        &self,
        match_id: MatchId,
    ) -> impl Future<Output = Result<LiveSnapshot, ClientError>> + Send;

    /// Fetches one denormalized event.
    fn fetch_event(
        &self,
        event_id: EventId,
    ) -> impl Future<Output = Result<EventView, ClientError>> + Send;
}

/// Push channel of row-level change notifications.
pub trait ChangeSource: Send + Sync + 'static {
    /// Subscribes to changes of `match_id`. The stream ends or yields an
    /// error when the subscription breaks.
    fn subscribe(
        &self,
        match_id: MatchId,
    ) -> impl Future<Output = Result<ChangeStream, ClientError>> + Send;
}

/// Authoritative writes issued by the admin scorer.
pub trait ScoringBackend: Send + Sync + 'static {
    /// Applies `command`, optionally guarded by `expected_version`.
    fn apply(
        &self,
        match_id: MatchId,
        command: ScoringCommand,
        expected_version: Option<u64>,
    ) -> impl Future<Output = Result<ActionOutcome, ClientError>> + Send;
}
