//! HTTP client for the TurboPi backend.
//!
//! One [`ApiClient`] per backend; endpoint groups live in sibling modules
//! (`control`, `camera`, `status`, `conversations`) as inherent methods.

pub mod camera;
pub mod control;
pub mod conversations;
pub mod http;
pub mod status;

pub use camera::{Snapshot, SnapshotData, SnapshotRequest};
pub use control::{ControlResult, MoveCommand, MoveDirection};
pub use conversations::{ChatStreamRequest, ConversationCreated, ConversationDeleted};
pub use http::ApiResponse;
pub use status::{CarState, HealthData, SystemStatus};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::plugins::RobotDevice;

use http::{decode_response, json_headers, shared_client, transport_error};

/// Client for the TurboPi backend API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>> {
        debug!(path, "GET");
        let resp = shared_client()
            .get(self.url(path))
            .headers(json_headers())
            .send()
            .await
            .map_err(transport_error)?;
        decode_response(resp).await
    }

    pub(crate) async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse<T>> {
        debug!(path, "POST");
        let resp = shared_client()
            .post(self.url(path))
            .headers(json_headers())
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        decode_response(resp).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>> {
        debug!(path, "DELETE");
        let resp = shared_client()
            .delete(self.url(path))
            .headers(json_headers())
            .send()
            .await
            .map_err(transport_error)?;
        decode_response(resp).await
    }
}

#[async_trait]
impl RobotDevice for ApiClient {
    async fn move_robot(&self, command: &MoveCommand) -> Result<ControlResult> {
        self.control_move(command).await?.into_data()
    }

    async fn stop(&self) -> Result<ControlResult> {
        self.control_stop().await?.into_data()
    }

    async fn estop(&self) -> Result<ControlResult> {
        self.control_estop().await?.into_data()
    }

    async fn camera_snapshot(&self) -> Result<Option<SnapshotData>> {
        Ok(self.snapshot(&SnapshotRequest::default()).await?.data)
    }
}
