//! Admin action DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ScoringCommand;

/// Request body for `POST /fixtures/{id}/actions`.
///
/// ```json
/// { "action": "record_goal", "side": "a", "scorer_id": "…", "expected_version": 7 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ActionRequest {
    /// The admin command, tagged by `action`.
    #[serde(flatten)]
    pub command: ScoringCommand,
    /// Fail with 409 unless the fixture is at this version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_version: Option<u64>,
}
