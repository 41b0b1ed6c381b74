//! Integration tests for the HTTP API.
#![allow(clippy::panic)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use fixture_gateway::api;
use fixture_gateway::app_state::AppState;
use fixture_gateway::domain::{ChangeBus, FixtureRegistry, Roster};
use fixture_gateway::service::FixtureService;

fn test_app() -> Router {
    let service = FixtureService::new(
        Arc::new(FixtureRegistry::new()),
        Arc::new(Roster::new()),
        ChangeBus::new(64),
        20,
    );
    api::build_router().with_state(AppState::new(Arc::new(service)))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let body = body.map_or_else(Body::empty, |b| Body::from(b.to_string()));
    let Ok(request) = builder.body(body) else {
        panic!("invalid request");
    };
    let Ok(response) = app.clone().oneshot(request).await else {
        panic!("router failed");
    };
    let status = response.status();
    let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
        panic!("body read failed");
    };
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn id_of(value: &Value) -> String {
    let Some(id) = value["id"].as_str() else {
        panic!("missing id in {value}");
    };
    id.to_string()
}

/// Creates two teams, a striker on side A and a fixture between them.
async fn setup_fixture(app: &Router) -> (String, String) {
    let home_body = json!({"name": "Harbour Rovers", "short_name": "HAR"});
    let (status, home) = send(app, "POST", "/api/v1/teams", Some(home_body)).await;
    assert_eq!(status, StatusCode::CREATED);
    let away_body = json!({"name": "Quarry Athletic"});
    let (_, away) = send(app, "POST", "/api/v1/teams", Some(away_body)).await;

    let (status, striker) = send(
        app,
        "POST",
        &format!("/api/v1/teams/{}/players", id_of(&home)),
        Some(json!({"name": "Amara Okafor", "shirt_number": 9})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, fixture) = send(
        app,
        "POST",
        "/api/v1/fixtures",
        Some(json!({"side_a": id_of(&home), "side_b": id_of(&away)})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(fixture["status"], "upcoming");
    assert_eq!(fixture["half_length_minutes"], 20);
    (id_of(&fixture), id_of(&striker))
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["fixtures"], 0);
}

#[tokio::test]
async fn test_match_rules_and_openapi() {
    let app = test_app();
    let (status, rules) = send(&app, "GET", "/config/match-rules", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rules["default_half_length_minutes"], 20);

    let (status, doc) = send(&app, "GET", "/api-doc/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/v1/fixtures/{id}/actions"].is_object());
}

#[tokio::test]
async fn test_goal_flow_updates_live_snapshot() {
    let app = test_app();
    let (match_id, striker) = setup_fixture(&app).await;
    let actions = format!("/api/v1/fixtures/{match_id}/actions");

    let (status, started) = send(&app, "POST", &actions, Some(json!({"action": "start"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(started["fixture"]["status"], "live");
    assert!(started["event"].is_null());

    let (status, goal) = send(
        &app,
        "POST",
        &actions,
        Some(json!({"action": "record_goal", "side": "a", "scorer_id": striker})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(goal["fixture"]["score_a"], 1);
    assert_eq!(goal["event"]["kind"], "goal");
    assert_eq!(goal["event"]["minute"], 1);
    let event_id = id_of(&goal["event"]);

    let live_path = format!("/api/v1/fixtures/{match_id}/live");
    let (status, live) = send(&app, "GET", &live_path, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(live["fixture"]["score_a"], 1);
    assert_eq!(live["fixture"]["team_a"]["short_name"], "HAR");
    assert_eq!(live["events"][0]["scorer"]["name"], "Amara Okafor");

    let (status, event) = send(&app, "GET", &format!("/api/v1/events/{event_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(event["scorer"]["shirt_number"], 9);

    let clock_path = format!("/api/v1/fixtures/{match_id}/clock");
    let (status, clock) = send(&app, "GET", &clock_path, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(clock["half"], 1);
    assert_eq!(clock["running"], true);
}

#[tokio::test]
async fn test_goal_before_kickoff_is_rejected() {
    let app = test_app();
    let (match_id, _) = setup_fixture(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/fixtures/{match_id}/actions"),
        Some(json!({"action": "record_goal", "side": "b"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], 2101);

    let (_, events) = send(&app, "GET", &format!("/api/v1/fixtures/{match_id}/events"), None).await;
    assert_eq!(events["data"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_stale_expected_version_conflicts() {
    let app = test_app();
    let (match_id, _) = setup_fixture(&app).await;
    let actions = format!("/api/v1/fixtures/{match_id}/actions");

    let start = json!({"action": "start", "expected_version": 1});
    let (status, started) = send(&app, "POST", &actions, Some(start)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(started["fixture"]["version"], 2);

    let stale_pause = json!({"action": "pause", "expected_version": 1});
    let (status, body) = send(&app, "POST", &actions, Some(stale_pause)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], 2102);
}

#[tokio::test]
async fn test_reset_clears_events_and_score() {
    let app = test_app();
    let (match_id, striker) = setup_fixture(&app).await;
    let actions = format!("/api/v1/fixtures/{match_id}/actions");

    send(&app, "POST", &actions, Some(json!({"action": "start"}))).await;
    let goal = json!({"action": "record_goal", "side": "a", "scorer_id": striker});
    send(&app, "POST", &actions, Some(goal)).await;
    let (status, reset) = send(&app, "POST", &actions, Some(json!({"action": "reset"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reset["fixture"]["status"], "upcoming");
    assert_eq!(reset["fixture"]["score_a"], 0);
    assert!(reset["fixture"]["started_at"].is_null());

    let (_, live) = send(&app, "GET", &format!("/api/v1/fixtures/{match_id}/live"), None).await;
    assert_eq!(live["events"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_list_filters_by_status() {
    let app = test_app();
    let (live_id, _) = setup_fixture(&app).await;
    setup_fixture(&app).await;
    let actions = format!("/api/v1/fixtures/{live_id}/actions");
    send(&app, "POST", &actions, Some(json!({"action": "start"}))).await;

    let (status, all) = send(&app, "GET", "/api/v1/fixtures", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["pagination"]["total"], 2);

    let (_, live) = send(&app, "GET", "/api/v1/fixtures?status=live", None).await;
    assert_eq!(live["data"].as_array().map(Vec::len), Some(1));
    assert_eq!(live["data"][0]["id"], live_id.as_str());
}

#[tokio::test]
async fn test_unknown_and_deleted_fixture() {
    let app = test_app();
    let missing = uuid::Uuid::new_v4();
    let (status, body) = send(&app, "GET", &format!("/api/v1/fixtures/{missing}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], 2001);

    let (match_id, _) = setup_fixture(&app).await;
    let (status, _) = send(&app, "DELETE", &format!("/api/v1/fixtures/{match_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &format!("/api/v1/fixtures/{match_id}/live"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
