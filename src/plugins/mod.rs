//! Plugin (tool-call) extraction, deduplication, and execution.

pub mod extract;
pub mod executor;
pub mod key;
pub mod robot;

pub use extract::parse_plugin_call;
pub use executor::PluginExecutor;
pub use key::{call_key, stable_stringify};
pub use robot::{normalize_cmd, RobotCommand};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::api::{ControlResult, MoveCommand, SnapshotData};
use crate::error::Result;

/// Plugin names the engine will execute. Anything else is treated as prose.
pub const ALLOWED_PLUGIN_NAMES: [&str; 2] = ["robot_ctrl", "take_photo_for_recognition"];

/// A tool invocation extracted from streamed assistant text.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginCall {
    pub plugin_name: String,
    pub arguments: Map<String, Value>,
    pub plugin_icon: Option<String>,
}

/// Side-effecting device operations the execution engine drives.
///
/// [`crate::api::ApiClient`] implements this against the real backend;
/// tests substitute a recording mock.
#[async_trait]
pub trait RobotDevice: Send + Sync {
    async fn move_robot(&self, command: &MoveCommand) -> Result<ControlResult>;
    async fn stop(&self) -> Result<ControlResult>;
    async fn estop(&self) -> Result<ControlResult>;
    async fn camera_snapshot(&self) -> Result<Option<SnapshotData>>;
}
