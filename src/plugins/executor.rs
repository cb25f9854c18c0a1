//! Deduplication and execution engine for queued plugin calls.
//!
//! Calls are collected while a turn streams and executed serially at the
//! `completed` event: two movement commands must never race on the physical
//! device. Identity is the canonical [`call_key`]; each unique call runs at
//! most once per conversation turn.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::{debug, info};

use super::robot::{move_payload, normalize_cmd, RobotCommand};
use super::{call_key, stable_stringify, PluginCall, RobotDevice};
use crate::transcript::Message;

/// Per-conversation pending queues and executed sets.
///
/// State is owned by one chat session and keyed by conversation id; calls
/// observed before the `conversation_id` event lands are parked in a
/// pre-conversation buffer and migrated once the id is known.
#[derive(Debug, Default)]
pub struct PluginExecutor {
    pending: HashMap<String, Vec<PluginCall>>,
    executed: HashMap<String, HashSet<String>>,
    pending_before_conversation: Vec<PluginCall>,
}

impl PluginExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new streaming turn: clear any stray pre-conversation calls
    /// left over from an aborted turn.
    pub fn begin_turn(&mut self) {
        self.pending_before_conversation.clear();
    }

    /// The `conversation_id` event arrived: reset the executed set for this
    /// turn and migrate the pre-conversation buffer into the real queue.
    pub fn bind_conversation(&mut self, conversation_id: &str) {
        self.executed
            .insert(conversation_id.to_string(), HashSet::new());
        if !self.pending_before_conversation.is_empty() {
            let queue = self.pending.entry(conversation_id.to_string()).or_default();
            queue.append(&mut self.pending_before_conversation);
        }
    }

    /// Queue a call for execution at the end of the turn.
    pub fn enqueue(&mut self, conversation_id: Option<&str>, call: PluginCall) {
        debug!(plugin = %call.plugin_name, ?conversation_id, "plugin call queued");
        match conversation_id {
            Some(id) => self.pending.entry(id.to_string()).or_default().push(call),
            None => self.pending_before_conversation.push(call),
        }
    }

    /// Discard all state for a deleted conversation.
    pub fn forget(&mut self, conversation_id: &str) {
        self.pending.remove(conversation_id);
        self.executed.remove(conversation_id);
    }

    /// Number of calls currently queued for a conversation.
    pub fn pending_len(&self, conversation_id: &str) -> usize {
        self.pending.get(conversation_id).map_or(0, Vec::len)
    }

    /// Drain the queue for one conversation and execute each unique call
    /// serially, returning the transcript messages produced in order.
    ///
    /// The queue is deduplicated first-occurrence-wins; the executed set is
    /// checked again immediately before each call to catch duplicates
    /// submitted across multiple drains within the same turn. A failed call
    /// is reported and does not stop the rest of the queue.
    pub async fn drain_and_execute(
        &mut self,
        conversation_id: &str,
        device: &dyn RobotDevice,
    ) -> Vec<Message> {
        let queued = self.pending.remove(conversation_id).unwrap_or_default();
        if queued.is_empty() {
            return Vec::new();
        }
        info!(conversation_id, count = queued.len(), "draining plugin queue");

        let mut seen = HashSet::new();
        let unique: Vec<PluginCall> = queued
            .into_iter()
            .filter(|call| seen.insert(call_key(call)))
            .collect();

        let mut reports = Vec::with_capacity(unique.len());
        for call in unique {
            reports.push(self.execute_call(conversation_id, call, device).await);
        }
        reports
    }

    async fn execute_call(
        &mut self,
        conversation_id: &str,
        call: PluginCall,
        device: &dyn RobotDevice,
    ) -> Message {
        let key = call_key(&call);
        let executed = self.executed.entry(conversation_id.to_string()).or_default();
        if executed.contains(&key) {
            return Message::assistant(format!(
                "⚠️ 已检测为重复调用，已忽略：{} | {}",
                call.plugin_name,
                stable_stringify(&Value::Object(call.arguments.clone())),
            ));
        }

        let ts = timestamp();
        match run_plugin(&call, device).await {
            Ok(report) => {
                // Only successful executions count against the per-turn set.
                self.executed
                    .entry(conversation_id.to_string())
                    .or_default()
                    .insert(key);
                Message::assistant(report)
            }
            Err(message) => Message::assistant(format!(
                "插件执行失败（{}）：{message}。时间：{ts}",
                call.plugin_name,
            )),
        }
    }
}

async fn run_plugin(call: &PluginCall, device: &dyn RobotDevice) -> Result<String, String> {
    let ts = timestamp();
    match call.plugin_name.as_str() {
        "robot_ctrl" => {
            let raw_cmd = call
                .arguments
                .get("cmd")
                .and_then(Value::as_str)
                .unwrap_or("stop");
            match normalize_cmd(raw_cmd) {
                RobotCommand::Stop => {
                    device.stop().await.map_err(|e| e.to_string())?;
                    Ok(format!("插件执行完成（机器人控制）：已停止。时间：{ts}"))
                }
                RobotCommand::Estop => {
                    device.estop().await.map_err(|e| e.to_string())?;
                    Ok(format!("插件执行完成（机器人控制）：紧急停止。时间：{ts}"))
                }
                RobotCommand::Move(direction) => {
                    let payload = move_payload(direction, &call.arguments);
                    device.move_robot(&payload).await.map_err(|e| e.to_string())?;
                    Ok(format!(
                        "插件执行完成（机器人控制）：{}，速度={}，时长={}ms。时间：{ts}",
                        payload.command,
                        payload.speed.unwrap_or_default(),
                        payload.duration_ms.unwrap_or_default(),
                    ))
                }
            }
        }
        "take_photo_for_recognition" => {
            let data = device.camera_snapshot().await.map_err(|e| e.to_string())?;
            match data {
                Some(data) => {
                    let s = &data.snapshot;
                    if s.base64.is_empty() {
                        Ok(format!(
                            "插件执行完成（拍照识别）：已拍照，但无图像数据。路径={}，尺寸={}x{}，时间戳={}",
                            s.saved_path, s.width, s.height, s.timestamp,
                        ))
                    } else {
                        // Whitespace in the payload would break the data URI.
                        let clean: String =
                            s.base64.chars().filter(|c| !c.is_whitespace()).collect();
                        Ok(format!(
                            "插件执行完成（拍照识别）：尺寸={}x{}，时间戳={}\n\n![拍照结果](data:image/jpeg;base64,{clean})",
                            s.width, s.height, s.timestamp,
                        ))
                    }
                }
                None => Ok(format!(
                    "插件执行完成（拍照识别）：已拍照，但无详细数据。时间：{ts}"
                )),
            }
        }
        other => Err(format!("未知插件: {other}")),
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
