//! Domain layer: fixtures, events, the match clock, and change notifications.
//!
//! This module contains the model shared by the gateway and the live feed
//! client: typed identifiers, the fixture lifecycle, append-only match
//! events, the pure clock derivation, denormalized views, the change bus
//! broadcasting row-level notifications, and the fixture registry.

pub mod change;
pub mod change_bus;
pub mod clock;
pub mod command;
pub mod fixture;
pub mod fixture_entry;
pub mod fixture_registry;
pub mod ids;
pub mod match_event;
pub mod roster;
pub mod view;

pub use change::{ChangeKind, ChangeNotification, Table};
pub use change_bus::ChangeBus;
pub use clock::{ClockReading, display_minute, elapsed_seconds};
pub use command::ScoringCommand;
pub use fixture::{DEFAULT_HALF_LENGTH_MINUTES, Fixture, Half, MatchStatus, Side};
pub use fixture_entry::{FixtureEntry, FixtureSummary};
pub use fixture_registry::FixtureRegistry;
pub use ids::{EventId, MatchId, PlayerId, TeamId};
pub use match_event::{EventKind, MatchEvent};
pub use roster::{Player, PlayerSummary, Roster, Team, TeamSummary};
pub use view::{EventView, FixtureView, LiveSnapshot};
