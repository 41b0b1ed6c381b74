//! Integration tests for the live feed client.
#![allow(clippy::panic)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio_test::{assert_err, assert_ok};

use fixture_gateway::client::{
    AdminScorer, ChangeSource, ChangeStream, ClientError, FeedOptions, FixtureSource, LiveFeed,
    LiveView, LocalGateway,
};
use fixture_gateway::domain::{
    ChangeBus, EventId, EventKind, EventView, FixtureRegistry, LiveSnapshot, MatchId,
    MatchStatus, PlayerId, Roster, ScoringCommand, Side,
};
use fixture_gateway::service::FixtureService;

const OPTIONS: FeedOptions = FeedOptions {
    poll_interval: Duration::from_millis(40),
    hold: Duration::from_millis(300),
};

struct Stadium {
    service: Arc<FixtureService>,
    gateway: Arc<LocalGateway>,
    match_id: MatchId,
    striker: PlayerId,
    defender: PlayerId,
}

async fn stadium() -> Stadium {
    let service = Arc::new(FixtureService::new(
        Arc::new(FixtureRegistry::new()),
        Arc::new(Roster::new()),
        ChangeBus::new(256),
        20,
    ));
    let home = assert_ok!(
        service
            .create_team("Harbour Rovers", Some("HAR".to_string()), None)
            .await
    );
    let away = assert_ok!(service.create_team("Quarry Athletic", None, None).await);
    let striker = assert_ok!(service.create_player(home.id, "Amara Okafor", Some(9)).await);
    let defender = assert_ok!(service.create_player(away.id, "Tomas Lind", Some(4)).await);
    let fixture = assert_ok!(service.create_fixture(home.id, away.id, None, None).await);
    assert_ok!(service.apply(fixture.fixture.id, ScoringCommand::Start, None).await);

    Stadium {
        gateway: Arc::new(LocalGateway::new(Arc::clone(&service))),
        service,
        match_id: fixture.fixture.id,
        striker: striker.id,
        defender: defender.id,
    }
}

fn goal(side: Side, scorer: PlayerId, own_goal: bool) -> ScoringCommand {
    ScoringCommand::RecordGoal {
        side,
        scorer_id: Some(scorer),
        assist_id: None,
        own_goal,
    }
}

async fn wait(feed: &LiveFeed, what: &str, predicate: impl FnMut(&LiveView) -> bool) -> LiveView {
    match tokio::time::timeout(Duration::from_secs(5), feed.wait_for(predicate)).await {
        Ok(Some(view)) => view,
        _ => panic!("timed out waiting for {what}"),
    }
}

async fn ready(feed: &LiveFeed) -> LiveView {
    wait(feed, "first snapshot", |v| v.connected && v.fixture.is_some()).await
}

/// Push channel that can never be established.
#[derive(Debug)]
struct RefusingChanges;

impl ChangeSource for RefusingChanges {
    async fn subscribe(&self, _match_id: MatchId) -> Result<ChangeStream, ClientError> {
        Err(ClientError::Malformed("connection refused".to_string()))
    }
}

/// Gateway whose first snapshot answers late.
#[derive(Debug)]
struct SlowFirstSnapshot {
    inner: Arc<LocalGateway>,
    delay: Duration,
    served: AtomicBool,
}

impl FixtureSource for SlowFirstSnapshot {
    async fn fetch_snapshot(&self, match_id: MatchId) -> Result<LiveSnapshot, ClientError> {
        if !self.served.swap(true, Ordering::SeqCst) {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.fetch_snapshot(match_id).await
    }

    async fn fetch_event(&self, event_id: EventId) -> Result<EventView, ClientError> {
        self.inner.fetch_event(event_id).await
    }
}

#[tokio::test]
async fn goal_is_celebrated_once_despite_push_and_poll() {
    let s = stadium().await;
    let feed = LiveFeed::start(Arc::clone(&s.gateway), Arc::clone(&s.gateway), s.match_id, OPTIONS);
    ready(&feed).await;

    assert_ok!(s.service.apply(s.match_id, goal(Side::A, s.striker, false), None).await);

    let view = wait(&feed, "celebration", |v| v.celebrating.is_some()).await;
    assert_eq!(view.celebrations, 1);
    let Some(celebrating) = view.celebrating else {
        panic!("no celebration");
    };
    assert_eq!(celebrating.scorer.map(|p| p.name), Some("Amara Okafor".to_string()));

    // Several poll cycles deliver the same goal again.
    tokio::time::sleep(OPTIONS.poll_interval * 5).await;
    let view = feed.view();
    assert_eq!(view.celebrations, 1);
    assert_eq!(view.events.len(), 1);
    assert_eq!(view.fixture.map(|f| f.fixture.score_a), Some(1));

    let view = wait(&feed, "overlay hidden", |v| v.celebrating.is_none()).await;
    assert_eq!(view.celebrations, 1);
}

#[tokio::test]
async fn own_goal_updates_score_without_celebration() {
    let s = stadium().await;
    let feed = LiveFeed::start(Arc::clone(&s.gateway), Arc::clone(&s.gateway), s.match_id, OPTIONS);
    ready(&feed).await;

    assert_ok!(s.service.apply(s.match_id, goal(Side::A, s.defender, true), None).await);

    let view = wait(&feed, "own goal", |v| v.last_goal.is_some()).await;
    assert_eq!(view.last_goal.map(|e| e.event.kind), Some(EventKind::OwnGoal));
    tokio::time::sleep(OPTIONS.poll_interval * 3).await;
    let view = feed.view();
    assert_eq!(view.celebrations, 0);
    assert!(view.celebrating.is_none());
    assert_eq!(view.fixture.map(|f| f.fixture.score_a), Some(1));
}

#[tokio::test]
async fn viewer_joining_mid_match_does_not_replay_goals() {
    let s = stadium().await;
    assert_ok!(s.service.apply(s.match_id, goal(Side::A, s.striker, false), None).await);

    let feed = LiveFeed::start(Arc::clone(&s.gateway), Arc::clone(&s.gateway), s.match_id, OPTIONS);
    let view = wait(&feed, "historical goal", |v| v.events.len() == 1).await;
    assert!(view.last_goal.is_some());

    tokio::time::sleep(OPTIONS.poll_interval * 3).await;
    assert_eq!(feed.view().celebrations, 0);

    // A later goal still celebrates.
    assert_ok!(s.service.apply(s.match_id, goal(Side::A, s.striker, false), None).await);
    let view = wait(&feed, "second goal", |v| v.celebrations == 1).await;
    assert_eq!(view.events.len(), 2);
}

#[tokio::test]
async fn goal_after_timer_restart_is_celebrated() {
    let s = stadium().await;
    let Ok(entry) = s.service.registry().get(s.match_id).await else {
        panic!("fixture missing");
    };
    entry.write().await.fixture.started_at =
        Some(chrono::Utc::now() - chrono::TimeDelta::minutes(15));

    let feed = LiveFeed::start(Arc::clone(&s.gateway), Arc::clone(&s.gateway), s.match_id, OPTIONS);
    ready(&feed).await;

    assert_ok!(s.service.apply(s.match_id, goal(Side::A, s.striker, false), None).await);
    wait(&feed, "first celebration", |v| v.celebrations == 1).await;

    assert_ok!(s.service.apply(s.match_id, ScoringCommand::RestartTimer, None).await);
    assert_ok!(s.service.apply(s.match_id, goal(Side::A, s.striker, false), None).await);

    let view = wait(&feed, "second celebration", |v| v.celebrations == 2).await;
    let minutes: Vec<u32> = view.events.iter().map(|e| e.event.minute).collect();
    assert_eq!(minutes, vec![16, 1]);
    assert_eq!(view.last_goal.map(|e| e.event.minute), Some(1));

    tokio::time::sleep(OPTIONS.poll_interval * 3).await;
    assert_eq!(feed.view().celebrations, 2);
}

#[tokio::test]
async fn goal_pushed_before_first_snapshot_is_celebrated() {
    let s = stadium().await;
    let source = Arc::new(SlowFirstSnapshot {
        inner: Arc::clone(&s.gateway),
        delay: Duration::from_millis(200),
        served: AtomicBool::new(false),
    });
    let feed = LiveFeed::start(source, Arc::clone(&s.gateway), s.match_id, OPTIONS);
    let view = wait(&feed, "push connected", |v| v.connected).await;
    assert!(view.events.is_empty());

    assert_ok!(s.service.apply(s.match_id, goal(Side::A, s.striker, false), None).await);

    let view = wait(&feed, "celebration", |v| v.celebrations == 1).await;
    assert_eq!(view.events.len(), 1);

    tokio::time::sleep(OPTIONS.poll_interval * 5).await;
    let view = feed.view();
    assert_eq!(view.celebrations, 1);
    assert_eq!(view.fixture.map(|f| f.fixture.score_a), Some(1));
}

#[tokio::test]
async fn polling_converges_when_push_is_down() {
    let s = stadium().await;
    let feed = LiveFeed::start(
        Arc::clone(&s.gateway),
        Arc::new(RefusingChanges),
        s.match_id,
        OPTIONS,
    );
    let view = wait(&feed, "first snapshot", |v| v.fixture.is_some()).await;
    assert!(!view.connected);

    assert_ok!(s.service.apply(s.match_id, goal(Side::A, s.striker, false), None).await);
    assert_ok!(s.service.apply(s.match_id, ScoringCommand::HalfTime, None).await);

    let view = wait(&feed, "half time via polling", |v| {
        v.fixture.as_ref().is_some_and(|f| f.fixture.is_half_time_break())
    })
    .await;
    assert!(!view.connected);
    assert_eq!(view.events.len(), 1);
    assert_eq!(view.celebrations, 1);
}

#[tokio::test]
async fn reset_and_delete_propagate() {
    let s = stadium().await;
    let feed = LiveFeed::start(Arc::clone(&s.gateway), Arc::clone(&s.gateway), s.match_id, OPTIONS);
    ready(&feed).await;

    assert_ok!(s.service.apply(s.match_id, goal(Side::B, s.defender, false), None).await);
    wait(&feed, "goal", |v| v.events.len() == 1).await;

    assert_ok!(s.service.apply(s.match_id, ScoringCommand::Reset, None).await);
    let view = wait(&feed, "reset", |v| v.events.is_empty()).await;
    assert_eq!(
        view.fixture.map(|f| f.fixture.status),
        Some(MatchStatus::Upcoming)
    );
    assert!(view.last_goal.is_none());

    assert_ok!(s.service.delete_fixture(s.match_id).await);
    wait(&feed, "deletion", |v| v.deleted).await;
}

#[tokio::test]
async fn admin_scorer_confirms_writes() {
    let s = stadium().await;
    let mut scorer = AdminScorer::new(Arc::clone(&s.gateway));
    assert_ok!(scorer.select(s.match_id).await);

    let outcome = assert_ok!(scorer.act(goal(Side::A, s.striker, false)).await);
    assert!(outcome.event.is_some());
    assert_eq!(scorer.fixture().map(|f| f.fixture.score_a), Some(1));
    assert_eq!(scorer.events().len(), 1);
    assert!(scorer.subscribe().borrow().pending.is_none());

    let Some(clock) = scorer.clock(chrono::Utc::now()) else {
        panic!("clock missing");
    };
    assert_eq!(clock.half, 1);
}

#[tokio::test]
async fn admin_scorer_rolls_back_on_conflict() {
    let s = stadium().await;
    let mut scorer = AdminScorer::new(Arc::clone(&s.gateway));
    assert_ok!(scorer.select(s.match_id).await);

    // Another operator scores first.
    assert_ok!(s.service.apply(s.match_id, goal(Side::B, s.defender, false), None).await);

    let err = assert_err!(scorer.act(ScoringCommand::HalfTime).await);
    assert!(err.is_conflict());

    let Some(fixture) = scorer.fixture() else {
        panic!("fixture missing");
    };
    assert!(!fixture.fixture.is_half_time_break());
    assert_eq!(fixture.fixture.score_b, 1);
    assert_eq!(scorer.events().len(), 1);
    assert!(scorer.subscribe().borrow().last_error.is_some());

    // The refreshed copy carries the current version, so a retry succeeds.
    assert_ok!(scorer.act(ScoringCommand::HalfTime).await);
    assert!(scorer.fixture().is_some_and(|f| f.fixture.is_half_time_break()));
}
