//! Common imports for working with the TurboPi client.

pub use crate::api::{
    ApiClient, ChatStreamRequest, ControlResult, MoveCommand, MoveDirection, SnapshotData,
    SnapshotRequest,
};
pub use crate::config::ClientConfig;
pub use crate::error::{Result, TurboPiError};
pub use crate::plugins::{parse_plugin_call, PluginCall, PluginExecutor, RobotDevice};
pub use crate::session::{ChatSession, TurnOutcome};
pub use crate::stream::{EventStream, StreamEvent, StreamMode};
pub use crate::transcript::{Conversation, Message, Role};
