//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered change
//! notifications.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::FollowedFixtures;
use crate::domain::{ChangeNotification, MatchId};
use crate::service::FixtureService;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards notifications of followed fixtures from the
///   [`broadcast::Receiver`] to the client.
pub async fn run_connection(
    socket: WebSocket,
    mut change_rx: broadcast::Receiver<ChangeNotification>,
    fixture_service: Arc<FixtureService>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = FollowedFixtures::new();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response =
                            handle_text_message(&text, &mut subs, &fixture_service).await;
                        if let Some(resp_json) = response
                            && ws_tx.send(Message::text(resp_json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            change = change_rx.recv() => {
                match change {
                    Ok(notification) => {
                        if subs.forward(&notification) {
                            let msg = WsMessage::server(
                                WsMessageType::Event,
                                serde_json::to_value(&notification).unwrap_or_default(),
                            );
                            let json = serde_json::to_string(&msg).unwrap_or_default();
                            if ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind change bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Handles a text message from the client, returning an optional JSON
/// response.
async fn handle_text_message(
    text: &str,
    subs: &mut FollowedFixtures,
    fixture_service: &FixtureService,
) -> Option<String> {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return error_reply(String::new(), 400, "malformed JSON");
    };

    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return error_reply(msg.id, 404, "unknown command");
    };

    let payload = match command {
        WsCommand::Subscribe { match_ids } => {
            let (ids, wildcard) = parse_match_ids(&match_ids);
            subs.follow(&ids, wildcard);
            tracing::debug!(count = subs.count(), wildcard, "ws subscribe");
            serde_json::json!({
                "subscribed": ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "count": subs.count(),
                "wildcard": subs.follows_all(),
            })
        }
        WsCommand::Unsubscribe { match_ids } => {
            let (ids, wildcard) = parse_match_ids(&match_ids);
            subs.unfollow(&ids, wildcard);
            serde_json::json!({
                "unsubscribed": ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "remaining_count": subs.count(),
                "wildcard": subs.follows_all(),
            })
        }
        WsCommand::GetSnapshot { match_id } => {
            let Ok(match_id) = match_id.parse::<MatchId>() else {
                return error_reply(msg.id, 400, "invalid match_id");
            };
            match fixture_service.live_snapshot(match_id).await {
                Ok(snapshot) => serde_json::to_value(&snapshot).unwrap_or_default(),
                Err(e) => return error_reply(msg.id, e.error_code(), &e.to_string()),
            }
        }
    };

    let response = WsMessage::reply(msg.id, WsMessageType::Response, payload);
    serde_json::to_string(&response).ok()
}

/// Splits raw ids into parsed fixture ids and the wildcard flag; invalid
/// ids are ignored.
fn parse_match_ids(raw: &[String]) -> (Vec<MatchId>, bool) {
    let mut ids = Vec::new();
    let mut wildcard = false;
    for value in raw {
        if value == "*" {
            wildcard = true;
        } else if let Ok(id) = value.parse::<MatchId>() {
            ids.push(id);
        }
    }
    (ids, wildcard)
}

fn error_reply(id: String, code: u32, message: &str) -> Option<String> {
    let err = WsMessage::reply(
        id,
        WsMessageType::Error,
        serde_json::json!({
            "code": code,
            "message": message,
        }),
    );
    serde_json::to_string(&err).ok()
}
