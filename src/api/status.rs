//! Backend status and health probes (`/status/*`).

use serde::Deserialize;

use super::{ApiClient, ApiResponse};
use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct HealthData {
    pub status: String,
    #[serde(default)]
    pub runtime_mode: String,
    #[serde(default)]
    pub uptime_seconds: f64,
    #[serde(default)]
    pub runtime_initialized: bool,
    #[serde(default)]
    pub provider_available: bool,
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemStatus {
    #[serde(default)]
    pub runtime_mode: String,
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub uptime_seconds: f64,
    #[serde(default)]
    pub car_state: Option<CarState>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CarState {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub last_command: Option<String>,
    #[serde(default)]
    pub last_command_time: Option<String>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub uptime_seconds: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeMode {
    pub runtime_mode: String,
}

impl ApiClient {
    pub async fn status(&self) -> Result<ApiResponse<SystemStatus>> {
        self.get("/status/").await
    }

    pub async fn health(&self) -> Result<ApiResponse<HealthData>> {
        self.get("/status/health").await
    }

    pub async fn mode(&self) -> Result<ApiResponse<RuntimeMode>> {
        self.get("/status/mode").await
    }
}
