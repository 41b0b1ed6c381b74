//! # fixture-gateway
//!
//! Live match clock and event synchronization for a tournament platform.
//!
//! The crate has two halves. The gateway is the authoritative store for
//! fixtures, match events, teams and players, served over REST with a
//! WebSocket change-notification channel. The live feed client keeps every
//! viewer (admin scorer, public live page, stadium scoreboard) consistent
//! with it: the match clock is derived from timing anchors on every tick,
//! push notifications and periodic snapshots merge into one idempotent
//! state, and each new goal is celebrated exactly once.
//!
//! ## Architecture
//!
//! ```text
//! Gateway                                 Live feed client
//!
//! Clients (HTTP, WebSocket)               LiveFeed (client/)
//!     │                                       ├── push: ChangeSource ──┐
//!     ├── REST Handlers (api/)                ├── poll: FixtureSource ─┤
//!     ├── WS Handler (ws/)  ──── changes ──>  │                        v
//!     │                                       ├── reducer: LiveState + CelebrationTrigger
//!     ├── FixtureService (service/)           │
//!     ├── ChangeBus (domain/)               AdminScorer (client/) ── actions ──> REST
//!     │                                     scoreboard::render (client/)
//!     ├── FixtureRegistry, Roster (domain/)
//!     ├── clock derivation (domain/)
//!     │
//!     └── PostgreSQL Persistence
//! ```

pub mod api;
pub mod app_state;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;
