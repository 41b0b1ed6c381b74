//! Fixtures followed by one WebSocket connection.
//!
//! A scoreboard follows the fixture it displays; an operator console can
//! follow every fixture with `"*"`. A deleted fixture can never change
//! again, so it stops being followed once its delete has been forwarded.

use std::collections::HashSet;

use crate::domain::{ChangeKind, ChangeNotification, MatchId, Table};

/// Change filter of a single connection.
#[derive(Debug, Default)]
pub struct FollowedFixtures {
    fixtures: HashSet<MatchId>,
    /// Set by `"*"`; explicit fixtures are kept so a later wildcard
    /// unfollow falls back to them.
    all: bool,
}

impl FollowedFixtures {
    /// Follows nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts following `ids`, and every fixture when `wildcard` is set.
    pub fn follow(&mut self, ids: &[MatchId], wildcard: bool) {
        self.all |= wildcard;
        self.fixtures.extend(ids.iter().copied());
    }

    /// Stops following `ids`; `wildcard` drops the follow-everything flag.
    pub fn unfollow(&mut self, ids: &[MatchId], wildcard: bool) {
        if wildcard {
            self.all = false;
        }
        for id in ids {
            self.fixtures.remove(id);
        }
    }

    /// Whether changes of `match_id` reach this connection.
    #[must_use]
    pub fn follows(&self, match_id: MatchId) -> bool {
        self.all || self.fixtures.contains(&match_id)
    }

    /// Decides whether `notification` is sent to the client.
    ///
    /// A forwarded fixture delete also ends the explicit follow.
    pub fn forward(&mut self, notification: &ChangeNotification) -> bool {
        if !self.follows(notification.match_id) {
            return false;
        }
        if notification.table == Table::Fixtures && notification.change == ChangeKind::Delete {
            self.fixtures.remove(&notification.match_id);
        }
        true
    }

    /// Number of explicitly followed fixtures.
    #[must_use]
    pub fn count(&self) -> usize {
        self.fixtures.len()
    }

    /// Whether every fixture is followed.
    #[must_use]
    pub const fn follows_all(&self) -> bool {
        self.all
    }
}
