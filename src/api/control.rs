//! Device movement endpoints (`/control/*`).

use serde::{Deserialize, Serialize};

use super::{ApiClient, ApiResponse};
use crate::error::Result;

/// One of the eight chassis directions accepted by `/control/move`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MoveDirection {
    Forward,
    Backward,
    Left,
    Right,
    ForwardLeft,
    ForwardRight,
    BackwardLeft,
    BackwardRight,
}

/// Payload for `/control/move`.
///
/// Backend contract: `speed` is 0.0–1.0, `duration_ms` is 0–10000.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveCommand {
    pub command: MoveDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl MoveCommand {
    pub fn new(command: MoveDirection) -> Self {
        Self {
            command,
            speed: None,
            duration_ms: None,
        }
    }
}

/// Acknowledgement payload from the control endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ControlResult {
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiClient {
    pub async fn control_move(&self, command: &MoveCommand) -> Result<ApiResponse<ControlResult>> {
        self.post_json("/control/move", command).await
    }

    pub async fn control_stop(&self) -> Result<ApiResponse<ControlResult>> {
        self.post_json("/control/stop", &serde_json::json!({})).await
    }

    pub async fn control_estop(&self) -> Result<ApiResponse<ControlResult>> {
        self.post_json("/control/estop", &serde_json::json!({})).await
    }

    pub async fn control_state(&self) -> Result<ApiResponse<serde_json::Value>> {
        self.get("/control/state").await
    }
}
