//! Camera snapshot endpoint (`/api/v1/camera/snapshot`).

use serde::{Deserialize, Serialize};

use super::{ApiClient, ApiResponse};
use crate::error::Result;

/// Optional capture overrides; the backend applies its own defaults.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SnapshotRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotData {
    pub snapshot: Snapshot,
    #[serde(default)]
    pub runtime_mode: Option<String>,
}

/// A captured frame, JPEG-encoded as base64.
#[derive(Debug, Clone, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub saved_path: String,
    #[serde(default)]
    pub base64: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub jpeg_quality: Option<u32>,
    #[serde(default)]
    pub timestamp: String,
}

impl ApiClient {
    pub async fn snapshot(&self, request: &SnapshotRequest) -> Result<ApiResponse<SnapshotData>> {
        self.post_json("/api/v1/camera/snapshot", request).await
    }
}
