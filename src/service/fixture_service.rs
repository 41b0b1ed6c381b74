//! Fixture service: orchestrates roster, fixture and scoring operations and
//! emits change notifications.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    ChangeBus, ChangeNotification, ClockReading, EventId, EventKind, EventView, Fixture,
    FixtureEntry, FixtureRegistry, FixtureSummary, FixtureView, LiveSnapshot, MatchEvent,
    MatchId, MatchStatus, Player, PlayerId, Roster, ScoringCommand, Team, TeamId, display_minute,
};
use crate::error::GatewayError;
use crate::persistence::{PostgresPersistence, RestoredState};

/// Result of an admin action: the fixture after the write and, for goals,
/// the event row that was appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ActionOutcome {
    /// Fixture after the action.
    pub fixture: FixtureView,
    /// Event created by the action, if any.
    pub event: Option<EventView>,
}

/// Orchestration layer for fixtures, events and the roster.
///
/// Every mutation follows the same pattern: acquire the per-fixture lock →
/// apply the change to a staged copy → write it through to persistence →
/// commit it in memory → emit change notifications. A goal's score update
/// and event insert are staged, persisted and committed together.
#[derive(Debug, Clone)]
pub struct FixtureService {
    registry: Arc<FixtureRegistry>,
    roster: Arc<Roster>,
    change_bus: ChangeBus,
    persistence: Option<PostgresPersistence>,
    default_half_length_minutes: u32,
}

impl FixtureService {
    /// Creates a new `FixtureService` without persistence.
    #[must_use]
    pub fn new(
        registry: Arc<FixtureRegistry>,
        roster: Arc<Roster>,
        change_bus: ChangeBus,
        default_half_length_minutes: u32,
    ) -> Self {
        Self {
            registry,
            roster,
            change_bus,
            persistence: None,
            default_half_length_minutes,
        }
    }

    /// Enables write-through persistence.
    #[must_use]
    pub fn with_persistence(mut self, persistence: PostgresPersistence) -> Self {
        self.persistence = Some(persistence);
        self
    }

    /// Returns a reference to the inner [`ChangeBus`].
    #[must_use]
    pub fn change_bus(&self) -> &ChangeBus {
        &self.change_bus
    }

    /// Returns a reference to the inner [`FixtureRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<FixtureRegistry> {
        &self.registry
    }

    /// Half length applied to fixtures created without one.
    #[must_use]
    pub const fn default_half_length_minutes(&self) -> u32 {
        self.default_half_length_minutes
    }

    /// Registers a team.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] for an empty name, or a
    /// persistence error.
    pub async fn create_team(
        &self,
        name: &str,
        short_name: Option<String>,
        logo_url: Option<String>,
    ) -> Result<Team, GatewayError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "team name must not be empty".to_string(),
            ));
        }
        let team = Team {
            id: TeamId::new(),
            name: name.to_string(),
            short_name,
            logo_url,
            created_at: Utc::now(),
        };
        if let Some(persistence) = &self.persistence {
            persistence.upsert_team(&team).await?;
        }
        self.roster.upsert_team(team.clone()).await;

        tracing::info!(team_id = %team.id, name = %team.name, "team created");
        Ok(team)
    }

    /// Registers a player on an existing team.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::TeamNotFound`] for an unknown team,
    /// [`GatewayError::InvalidRequest`] for an empty name, or a persistence
    /// error.
    pub async fn create_player(
        &self,
        team_id: TeamId,
        name: &str,
        shirt_number: Option<u16>,
    ) -> Result<Player, GatewayError> {
        self.roster.team(team_id).await?;
        let name = name.trim();
        if name.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "player name must not be empty".to_string(),
            ));
        }
        let player = Player {
            id: PlayerId::new(),
            team_id,
            name: name.to_string(),
            shirt_number,
        };
        if let Some(persistence) = &self.persistence {
            persistence.upsert_player(&player).await?;
        }
        self.roster.upsert_player(player.clone()).await?;

        tracing::info!(player_id = %player.id, %team_id, "player created");
        Ok(player)
    }

    /// Returns all teams sorted by name.
    pub async fn list_teams(&self) -> Vec<Team> {
        self.roster.teams().await
    }

    /// Returns the players of a team.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::TeamNotFound`] for an unknown team.
    pub async fn players_of(&self, team_id: TeamId) -> Result<Vec<Player>, GatewayError> {
        self.roster.team(team_id).await?;
        Ok(self.roster.players_of(team_id).await)
    }

    /// Schedules a fixture between two registered teams.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::TeamNotFound`] for an unknown team,
    /// [`GatewayError::InvalidRequest`] when both sides are the same team or
    /// the half length is zero, or a persistence error.
    pub async fn create_fixture(
        &self,
        side_a: TeamId,
        side_b: TeamId,
        scheduled_at: Option<DateTime<Utc>>,
        half_length_minutes: Option<u32>,
    ) -> Result<FixtureView, GatewayError> {
        if side_a == side_b {
            return Err(GatewayError::InvalidRequest(
                "a fixture needs two different teams".to_string(),
            ));
        }
        self.roster.team(side_a).await?;
        self.roster.team(side_b).await?;

        let half_length = half_length_minutes.unwrap_or(self.default_half_length_minutes);
        if half_length == 0 {
            return Err(GatewayError::InvalidRequest(
                "half_length_minutes must be positive".to_string(),
            ));
        }

        let fixture = Fixture::new(side_a, side_b, scheduled_at, half_length, Utc::now());
        if let Some(persistence) = &self.persistence {
            persistence.upsert_fixture(&fixture).await?;
        }
        let match_id = self.registry.insert(FixtureEntry::new(fixture.clone())).await?;
        self.change_bus
            .publish(ChangeNotification::fixture_inserted(&fixture));

        tracing::info!(%match_id, %side_a, %side_b, "fixture created");
        Ok(self.fixture_view(fixture).await)
    }

    /// Returns fixture summaries, optionally filtered by status.
    pub async fn list_fixtures(&self, status: Option<MatchStatus>) -> Vec<FixtureSummary> {
        self.registry.list(status).await
    }

    /// Returns the denormalized view of a fixture.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::FixtureNotFound`] for an unknown fixture.
    pub async fn get_fixture(&self, match_id: MatchId) -> Result<FixtureView, GatewayError> {
        let entry_lock = self.registry.get(match_id).await?;
        let fixture = entry_lock.read().await.fixture.clone();
        Ok(self.fixture_view(fixture).await)
    }

    /// Returns the fixture and its events, read under one lock.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::FixtureNotFound`] for an unknown fixture.
    pub async fn live_snapshot(&self, match_id: MatchId) -> Result<LiveSnapshot, GatewayError> {
        let entry_lock = self.registry.get(match_id).await?;
        let entry = entry_lock.read().await;
        let fixture = entry.fixture.clone();
        let events = entry.events_newest_first();
        drop(entry);

        let mut event_views = Vec::with_capacity(events.len());
        for event in events {
            event_views.push(self.event_view_of(event, &fixture).await);
        }
        Ok(LiveSnapshot {
            fixture: self.fixture_view(fixture).await,
            events: event_views,
        })
    }

    /// Returns a fixture's events, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::FixtureNotFound`] for an unknown fixture.
    pub async fn events_of(&self, match_id: MatchId) -> Result<Vec<EventView>, GatewayError> {
        Ok(self.live_snapshot(match_id).await?.events)
    }

    /// Returns one denormalized event by id.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::EventNotFound`] for an unknown event.
    pub async fn get_event(&self, event_id: EventId) -> Result<EventView, GatewayError> {
        let match_id = self.registry.locate_event(event_id).await?;
        let entry_lock = self.registry.get(match_id).await?;
        let entry = entry_lock.read().await;
        let fixture = entry.fixture.clone();
        let event = entry
            .events
            .iter()
            .find(|e| e.id == event_id)
            .cloned()
            .ok_or(GatewayError::EventNotFound(*event_id.as_uuid()))?;
        drop(entry);
        Ok(self.event_view_of(event, &fixture).await)
    }

    /// Reads the fixture's clock at the current server time.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::FixtureNotFound`] for an unknown fixture.
    pub async fn clock(&self, match_id: MatchId) -> Result<ClockReading, GatewayError> {
        let entry_lock = self.registry.get(match_id).await?;
        let entry = entry_lock.read().await;
        Ok(ClockReading::at(&entry.fixture, Utc::now()))
    }

    /// Applies an admin command to a fixture.
    ///
    /// `record_goal` credits the score and appends the event row under the
    /// same lock; the event's minute is the display minute at the time of
    /// the write. `reset` clears the fixture and deletes its events. When
    /// `expected_version` is set the write fails unless it matches.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::FixtureNotFound`],
    /// [`GatewayError::PlayerNotFound`], [`GatewayError::VersionConflict`],
    /// [`GatewayError::InvalidTransition`], or a persistence error. Nothing
    /// is changed when an error is returned.
    pub async fn apply(
        &self,
        match_id: MatchId,
        command: ScoringCommand,
        expected_version: Option<u64>,
    ) -> Result<ActionOutcome, GatewayError> {
        if let ScoringCommand::RecordGoal {
            scorer_id,
            assist_id,
            ..
        } = &command
        {
            for player_id in [scorer_id, assist_id].into_iter().flatten() {
                self.roster.player(*player_id).await?;
            }
        }

        let entry_lock = self.registry.get(match_id).await?;
        let mut entry = entry_lock.write().await;
        entry.fixture.check_version(expected_version)?;

        let now = Utc::now();
        let minute = display_minute(&entry.fixture, now);
        let half = entry.fixture.current_half;

        let mut staged = entry.fixture.clone();
        staged.apply(&command, now)?;

        let event = match &command {
            ScoringCommand::RecordGoal {
                side,
                scorer_id,
                assist_id,
                own_goal,
            } => Some(MatchEvent {
                id: EventId::new(),
                match_id,
                kind: if *own_goal {
                    EventKind::OwnGoal
                } else {
                    EventKind::Goal
                },
                side: *side,
                scorer_id: *scorer_id,
                assist_id: *assist_id,
                minute,
                half,
                sequence: entry.take_sequence(),
                recorded_at: now,
            }),
            _ => None,
        };
        let is_reset = matches!(command, ScoringCommand::Reset);

        if let Some(persistence) = &self.persistence {
            if let Some(event) = &event {
                persistence.record_goal(&staged, event).await?;
            } else if is_reset {
                persistence.reset_fixture(&staged).await?;
            } else {
                persistence.upsert_fixture(&staged).await?;
            }
        }

        entry.fixture = staged;
        let cleared = if is_reset {
            std::mem::take(&mut entry.events)
        } else {
            Vec::new()
        };
        if let Some(event) = &event {
            entry.events.push(event.clone());
        }
        let fixture = entry.fixture.clone();
        drop(entry);

        if let Some(event) = &event {
            self.registry.index_events(match_id, &[event.id]).await;
        }
        if !cleared.is_empty() {
            let ids: Vec<EventId> = cleared.iter().map(|e| e.id).collect();
            self.registry.unindex_events(&ids).await;
        }

        self.change_bus
            .publish(ChangeNotification::fixture_updated(&fixture));
        if let Some(event) = &event {
            self.change_bus
                .publish(ChangeNotification::event_inserted(event, fixture.version));
        }
        if is_reset {
            self.change_bus
                .publish(ChangeNotification::events_deleted(match_id, fixture.version));
        }

        tracing::info!(
            %match_id,
            action = command.action_str(),
            version = fixture.version,
            score_a = fixture.score_a,
            score_b = fixture.score_b,
            "fixture action applied"
        );

        let event = match event {
            Some(event) => Some(self.event_view_of(event, &fixture).await),
            None => None,
        };
        Ok(ActionOutcome {
            fixture: self.fixture_view(fixture).await,
            event,
        })
    }

    /// Removes a fixture and its events.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::FixtureNotFound`] for an unknown fixture, or
    /// a persistence error.
    pub async fn delete_fixture(&self, match_id: MatchId) -> Result<(), GatewayError> {
        self.registry.get(match_id).await?;
        if let Some(persistence) = &self.persistence {
            persistence.delete_fixture(match_id).await?;
        }
        let entry = self.registry.remove(match_id).await?;
        self.change_bus
            .publish(ChangeNotification::fixture_deleted(&entry.fixture));

        tracing::info!(%match_id, events = entry.events.len(), "fixture deleted");
        Ok(())
    }

    /// Rebuilds the in-memory state from persisted rows.
    ///
    /// Rows that no longer fit (a player of a missing team, a duplicate
    /// fixture) are skipped with a warning.
    pub async fn restore(&self, state: RestoredState) {
        let RestoredState {
            teams,
            players,
            fixtures,
            events,
        } = state;

        let team_count = teams.len();
        for team in teams {
            self.roster.upsert_team(team).await;
        }
        for player in players {
            let player_id = player.id;
            if let Err(e) = self.roster.upsert_player(player).await {
                tracing::warn!(%player_id, error = %e, "skipping stored player");
            }
        }

        let mut by_fixture: HashMap<MatchId, Vec<MatchEvent>> = HashMap::new();
        for event in events {
            by_fixture.entry(event.match_id).or_default().push(event);
        }

        let mut restored = 0_usize;
        for fixture in fixtures {
            let match_id = fixture.id;
            let events = by_fixture.remove(&match_id).unwrap_or_default();
            match self
                .registry
                .insert(FixtureEntry::restore(fixture, events))
                .await
            {
                Ok(_) => restored += 1,
                Err(e) => tracing::warn!(%match_id, error = %e, "skipping stored fixture"),
            }
        }

        tracing::info!(teams = team_count, fixtures = restored, "state restored");
    }

    async fn fixture_view(&self, fixture: Fixture) -> FixtureView {
        let team_a = self.roster.team_summary(fixture.side_a).await;
        let team_b = self.roster.team_summary(fixture.side_b).await;
        FixtureView {
            fixture,
            team_a,
            team_b,
        }
    }

    async fn event_view_of(&self, event: MatchEvent, fixture: &Fixture) -> EventView {
        let scorer = match event.scorer_id {
            Some(id) => self.roster.player_summary(id).await,
            None => None,
        };
        let assist = match event.assist_id {
            Some(id) => self.roster.player_summary(id).await,
            None => None,
        };
        let team = self.roster.team_summary(fixture.team(event.side)).await;
        EventView {
            event,
            scorer,
            assist,
            team,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{ChangeKind, Half, Side, Table};

    struct Setup {
        service: FixtureService,
        match_id: MatchId,
        striker: PlayerId,
    }

    fn make_service() -> FixtureService {
        FixtureService::new(
            Arc::new(FixtureRegistry::new()),
            Arc::new(Roster::new()),
            ChangeBus::new(1000),
            20,
        )
    }

    async fn setup() -> Setup {
        let service = make_service();
        let Ok(home) = service.create_team("Harbour Rovers", None, None).await else {
            panic!("team creation failed");
        };
        let Ok(away) = service.create_team("Valley Athletic", None, None).await else {
            panic!("team creation failed");
        };
        let Ok(striker) = service.create_player(home.id, "Ada Striker", Some(9)).await else {
            panic!("player creation failed");
        };
        let Ok(view) = service.create_fixture(home.id, away.id, None, None).await else {
            panic!("fixture creation failed");
        };
        Setup {
            service,
            match_id: view.fixture.id,
            striker: striker.id,
        }
    }

    fn goal(side: Side, scorer_id: Option<PlayerId>, own_goal: bool) -> ScoringCommand {
        ScoringCommand::RecordGoal {
            side,
            scorer_id,
            assist_id: None,
            own_goal,
        }
    }

    #[tokio::test]
    async fn create_fixture_requires_distinct_known_teams() {
        let service = make_service();
        let Ok(team) = service.create_team("Solo", None, None).await else {
            panic!("team creation failed");
        };
        let same = service.create_fixture(team.id, team.id, None, None).await;
        assert!(matches!(same, Err(GatewayError::InvalidRequest(_))));

        let unknown = service
            .create_fixture(team.id, TeamId::new(), None, None)
            .await;
        assert!(matches!(unknown, Err(GatewayError::TeamNotFound(_))));
    }

    #[tokio::test]
    async fn create_fixture_emits_insert_and_uses_default_half_length() {
        let service = make_service();
        let mut rx = service.change_bus().subscribe();
        let (Ok(a), Ok(b)) = (
            service.create_team("A", None, None).await,
            service.create_team("B", None, None).await,
        ) else {
            panic!("team creation failed");
        };
        let Ok(view) = service.create_fixture(a.id, b.id, None, None).await else {
            panic!("fixture creation failed");
        };
        assert_eq!(view.fixture.half_length_minutes, 20);
        assert_eq!(view.team_a.map(|t| t.name), Some("A".to_string()));

        let Ok(note) = rx.recv().await else {
            panic!("expected notification");
        };
        assert_eq!(note.event_type_str(), "fixture_inserted");
    }

    #[tokio::test]
    async fn record_goal_updates_score_and_appends_event_together() {
        let s = setup().await;
        let _ = s.service.apply(s.match_id, ScoringCommand::Start, None).await;
        let mut rx = s.service.change_bus().subscribe();

        let Ok(outcome) = s
            .service
            .apply(s.match_id, goal(Side::A, Some(s.striker), false), None)
            .await
        else {
            panic!("goal failed");
        };
        assert_eq!(outcome.fixture.fixture.score_a, 1);
        let Some(event) = outcome.event else {
            panic!("goal should create an event");
        };
        assert_eq!(event.event.kind, EventKind::Goal);
        assert_eq!(event.event.minute, 1);
        assert_eq!(event.event.half, Half::First);
        assert_eq!(event.scorer.map(|p| p.name), Some("Ada Striker".to_string()));

        let Ok(update) = rx.recv().await else {
            panic!("expected fixture update");
        };
        assert_eq!((update.table, update.change), (Table::Fixtures, ChangeKind::Update));
        let Ok(insert) = rx.recv().await else {
            panic!("expected event insert");
        };
        assert_eq!((insert.table, insert.change), (Table::Events, ChangeKind::Insert));
        assert_eq!(insert.version, update.version);

        let Ok(fetched) = s.service.get_event(event.event.id).await else {
            panic!("event should be fetchable by id");
        };
        assert_eq!(fetched.event.id, event.event.id);
    }

    #[tokio::test]
    async fn goal_before_kickoff_changes_nothing() {
        let s = setup().await;
        let result = s
            .service
            .apply(s.match_id, goal(Side::B, None, false), None)
            .await;
        assert!(matches!(result, Err(GatewayError::InvalidTransition(_))));

        let Ok(snapshot) = s.service.live_snapshot(s.match_id).await else {
            panic!("snapshot failed");
        };
        assert!(snapshot.events.is_empty());
        assert_eq!(snapshot.fixture.fixture.score_b, 0);
        assert_eq!(snapshot.fixture.fixture.version, 1);
    }

    #[tokio::test]
    async fn unknown_scorer_is_rejected() {
        let s = setup().await;
        let _ = s.service.apply(s.match_id, ScoringCommand::Start, None).await;
        let result = s
            .service
            .apply(s.match_id, goal(Side::A, Some(PlayerId::new()), false), None)
            .await;
        assert!(matches!(result, Err(GatewayError::PlayerNotFound(_))));
    }

    #[tokio::test]
    async fn stale_expected_version_conflicts() {
        let s = setup().await;
        let Ok(started) = s.service.apply(s.match_id, ScoringCommand::Start, Some(1)).await else {
            panic!("start failed");
        };
        assert_eq!(started.fixture.fixture.version, 2);

        let result = s
            .service
            .apply(s.match_id, ScoringCommand::Pause, Some(1))
            .await;
        assert!(matches!(
            result,
            Err(GatewayError::VersionConflict {
                expected: 1,
                actual: 2
            })
        ));
    }

    #[tokio::test]
    async fn reset_clears_events_and_notifies() {
        let s = setup().await;
        let _ = s.service.apply(s.match_id, ScoringCommand::Start, None).await;
        let Ok(outcome) = s
            .service
            .apply(s.match_id, goal(Side::A, None, true), None)
            .await
        else {
            panic!("goal failed");
        };
        let Some(own_goal) = outcome.event else {
            panic!("expected event");
        };
        assert_eq!(own_goal.event.kind, EventKind::OwnGoal);

        let mut rx = s.service.change_bus().subscribe();
        let Ok(reset) = s.service.apply(s.match_id, ScoringCommand::Reset, None).await else {
            panic!("reset failed");
        };
        assert_eq!(reset.fixture.fixture.status, MatchStatus::Upcoming);
        assert_eq!(reset.fixture.fixture.score_a, 0);

        let Ok(events) = s.service.events_of(s.match_id).await else {
            panic!("events failed");
        };
        assert!(events.is_empty());
        assert!(matches!(
            s.service.get_event(own_goal.event.id).await,
            Err(GatewayError::EventNotFound(_))
        ));

        let _ = rx.recv().await;
        let Ok(deleted) = rx.recv().await else {
            panic!("expected events_deleted");
        };
        assert_eq!(deleted.event_type_str(), "events_deleted");
    }

    #[tokio::test]
    async fn delete_fixture_emits_delete() {
        let s = setup().await;
        let mut rx = s.service.change_bus().subscribe();
        assert!(s.service.delete_fixture(s.match_id).await.is_ok());
        assert!(matches!(
            s.service.get_fixture(s.match_id).await,
            Err(GatewayError::FixtureNotFound(_))
        ));
        let Ok(note) = rx.recv().await else {
            panic!("expected notification");
        };
        assert_eq!(note.event_type_str(), "fixture_deleted");
    }

    #[tokio::test]
    async fn restore_rebuilds_fixtures_with_events() {
        let s = setup().await;
        let _ = s.service.apply(s.match_id, ScoringCommand::Start, None).await;
        let _ = s
            .service
            .apply(s.match_id, goal(Side::A, Some(s.striker), false), None)
            .await;
        let Ok(snapshot) = s.service.live_snapshot(s.match_id).await else {
            panic!("snapshot failed");
        };

        let state = RestoredState {
            teams: s.service.list_teams().await,
            players: Vec::new(),
            fixtures: vec![snapshot.fixture.fixture.clone()],
            events: snapshot.events.iter().map(|e| e.event.clone()).collect(),
        };
        let fresh = make_service();
        fresh.restore(state).await;

        let Ok(restored) = fresh.live_snapshot(s.match_id).await else {
            panic!("restored fixture missing");
        };
        assert_eq!(restored.fixture.fixture, snapshot.fixture.fixture);
        assert_eq!(restored.events.len(), 1);
        assert!(restored.events.iter().all(|e| e.scorer.is_none()));
    }
}
