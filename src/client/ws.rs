//! WebSocket change source, built on `tokio-tungstenite`.

use futures_util::stream::SplitStream;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use super::ClientError;
use super::source::{ChangeSource, ChangeStream};
use crate::domain::{ChangeNotification, MatchId};
use crate::ws::messages::{WsCommand, WsMessage, WsMessageType};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Subscribes to the gateway's `/ws` endpoint.
#[derive(Debug, Clone)]
pub struct WsChangeSource {
    url: String,
}

impl WsChangeSource {
    /// Creates a source for the WebSocket endpoint at `url` (e.g.
    /// `ws://localhost:3000/ws`).
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl ChangeSource for WsChangeSource {
    async fn subscribe(&self, match_id: MatchId) -> Result<ChangeStream, ClientError> {
        let (socket, _) = connect_async(self.url.as_str()).await?;
        let (mut write, read) = socket.split();

        let command = WsMessage::command(&WsCommand::Subscribe {
            match_ids: vec![match_id.to_string()],
        });
        write
            .send(Message::Text(serde_json::to_string(&command)?.into()))
            .await?;
        tracing::debug!(%match_id, url = %self.url, "subscribed to change feed");

        // The write half rides along in the state so the socket stays open.
        let stream = futures_util::stream::unfold(Some((write, read)), |state| async move {
            let (write, mut read) = state?;
            next_notification(&mut read)
                .await
                .map(|item| (item, Some((write, read))))
        });
        Ok(Box::pin(stream))
    }
}

/// Reads frames until the next change notification, the end of the stream,
/// or an error.
async fn next_notification(
    read: &mut SplitStream<Socket>,
) -> Option<Result<ChangeNotification, ClientError>> {
    loop {
        match read.next().await? {
            Ok(Message::Text(text)) => match parse_frame(text.as_str()) {
                Ok(Some(notification)) => return Some(Ok(notification)),
                Ok(None) => {}
                Err(e) => return Some(Err(e)),
            },
            Ok(Message::Close(_)) => return None,
            Ok(_) => {}
            Err(e) => return Some(Err(e.into())),
        }
    }
}

/// Parses one text frame. Responses to commands are skipped; error frames
/// are surfaced.
fn parse_frame(text: &str) -> Result<Option<ChangeNotification>, ClientError> {
    let message: WsMessage = serde_json::from_str(text)?;
    match message.msg_type {
        WsMessageType::Event => Ok(Some(serde_json::from_value(message.payload)?)),
        WsMessageType::Error => Err(ClientError::Malformed(message.payload.to_string())),
        WsMessageType::Response | WsMessageType::Command => Ok(None),
    }
}
