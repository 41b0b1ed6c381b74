//! Live feed client: keeps a viewer's fixture, clock and goal feed in sync
//! with the gateway.
//!
//! - [`LiveFeed`] merges push notifications ([`ChangeSource`]) and periodic
//!   snapshots ([`FixtureSource`]) into one idempotent [`LiveState`] and
//!   fires the [`CelebrationTrigger`] once per new goal.
//! - [`AdminScorer`] is the writer surface with optimistic updates.
//! - [`scoreboard::render`] turns a [`LiveView`] into text.
//!
//! Transports: [`HttpGateway`] and [`WsChangeSource`] talk to a running
//! gateway; [`LocalGateway`] wraps an in-process
//! [`FixtureService`](crate::service::FixtureService).

pub mod celebration;
pub mod error;
pub mod http;
pub mod live_feed;
pub mod local;
pub mod payload;
pub mod reducer;
pub mod scoreboard;
pub mod scorer;
pub mod source;
pub mod ws;

pub use celebration::{CelebrationSignal, CelebrationTrigger};
pub use error::ClientError;
pub use http::HttpGateway;
pub use live_feed::{FeedOptions, LiveFeed, LiveView};
pub use local::LocalGateway;
pub use payload::{FeedUpdate, normalize};
pub use reducer::LiveState;
pub use scorer::{AdminScorer, ScorerView};
pub use source::{ChangeSource, ChangeStream, FixtureSource, ScoringBackend};
pub use ws::WsChangeSource;
