//! REST client for the gateway, built on `reqwest`.

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use super::ClientError;
use super::source::{FixtureSource, ScoringBackend};
use crate::api::dto::{ActionRequest, FixtureListResponse};
use crate::domain::{
    EventId, EventView, FixtureSummary, LiveSnapshot, MatchId, MatchStatus, ScoringCommand,
};
use crate::error::ErrorResponse;
use crate::service::ActionOutcome;

/// Gateway REST client.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    /// Creates a client for the gateway at `base_url` (e.g.
    /// `http://localhost:3000`).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Creates a client reusing an existing `reqwest::Client`.
    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Lists fixtures, optionally filtered by status (first 100).
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] on transport failure or an error response.
    pub async fn list_fixtures(
        &self,
        status: Option<MatchStatus>,
    ) -> Result<Vec<FixtureSummary>, ClientError> {
        let mut url = format!("{}/api/v1/fixtures?per_page=100", self.base_url);
        if let Some(status) = status {
            url.push_str("&status=");
            url.push_str(status.as_str());
        }
        let response = self.client.get(url).send().await?;
        let list: FixtureListResponse = decode(response).await?;
        Ok(list.data)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{path}", self.base_url)
    }
}

impl FixtureSource for HttpGateway {
    async fn fetch_snapshot(&self, match_id: MatchId) -> Result<LiveSnapshot, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("/fixtures/{match_id}/live")))
            .send()
            .await?;
        decode(response).await
    }

    async fn fetch_event(&self, event_id: EventId) -> Result<EventView, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("/events/{event_id}")))
            .send()
            .await?;
        decode(response).await
    }
}

impl ScoringBackend for HttpGateway {
    async fn apply(
        &self,
        match_id: MatchId,
        command: ScoringCommand,
        expected_version: Option<u64>,
    ) -> Result<ActionOutcome, ClientError> {
        let body = ActionRequest {
            command,
            expected_version,
        };
        let response = self
            .client
            .post(self.url(&format!("/fixtures/{match_id}/actions")))
            .json(&body)
            .send()
            .await?;
        decode(response).await
    }
}

/// Decodes a success body, or turns an error body into
/// [`ClientError::Gateway`].
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let text = response.text().await.unwrap_or_default();
    let (code, message) = match serde_json::from_str::<ErrorResponse>(&text) {
        Ok(body) => (Some(body.error.code), body.error.message),
        Err(_) => (None, text),
    };
    Err(ClientError::Gateway {
        status: status.as_u16(),
        code,
        message,
    })
}
