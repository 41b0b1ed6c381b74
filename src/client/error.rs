//! Live feed client errors.

use crate::error::GatewayError;

/// Errors raised by the live feed client and the admin scorer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP transport failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with an error body.
    #[error("gateway returned {status}: {message}")]
    Gateway {
        /// HTTP status code.
        status: u16,
        /// Gateway error code, when the body could be parsed.
        code: Option<u32>,
        /// Error message.
        message: String,
    },

    /// WebSocket transport failure.
    #[error("websocket error: {0}")]
    WebSocket(#[from] Box<tokio_tungstenite::tungstenite::Error>),

    /// A payload could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A notification did not have the expected shape.
    #[error("malformed notification: {0}")]
    Malformed(String),

    /// Error from an in-process gateway, or a command rejected locally.
    #[error(transparent)]
    Service(#[from] GatewayError),

    /// The admin scorer has no fixture selected.
    #[error("no fixture selected")]
    NotSelected,
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket(Box::new(err))
    }
}

impl ClientError {
    /// `true` when the gateway rejected a write because the fixture changed.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::Gateway { status: 409, .. }
                | Self::Service(GatewayError::VersionConflict { .. })
        )
    }

    /// `true` when the fixture no longer exists on the gateway.
    #[must_use]
    pub const fn is_fixture_missing(&self) -> bool {
        matches!(
            self,
            Self::Gateway {
                code: Some(2001),
                ..
            } | Self::Service(GatewayError::FixtureNotFound(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_gateway_bodies() {
        let conflict = ClientError::Gateway {
            status: 409,
            code: Some(2102),
            message: "stale".to_string(),
        };
        assert!(conflict.is_conflict());
        assert!(!conflict.is_fixture_missing());

        let missing = ClientError::Service(GatewayError::FixtureNotFound(uuid::Uuid::new_v4()));
        assert!(missing.is_fixture_missing());
        assert!(!ClientError::NotSelected.is_fixture_missing());
    }
}
