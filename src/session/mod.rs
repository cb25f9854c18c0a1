//! Turn orchestration: streaming events into transcript state and plugin
//! execution.
//!
//! One [`ChatSession`] owns the conversation list, the per-conversation
//! execution state, and a device handle. A single loop drives each turn, so
//! event processing between awaits never interleaves with itself.

use std::sync::Arc;

use futures::StreamExt;
use tracing::{debug, warn};

use crate::api::{ApiClient, ChatStreamRequest};
use crate::error::{Result, TurboPiError};
use crate::plugins::{parse_plugin_call, PluginExecutor, RobotDevice};
use crate::stream::{StreamEvent, StreamMode};
use crate::transcript::{
    append_message, apply_delta, apply_final, push_conversation, remove_conversation,
    Conversation, Message,
};

/// Result of one completed streaming turn.
#[derive(Debug, Clone, Default)]
pub struct TurnOutcome {
    /// The conversation the turn ran under, once known.
    pub conversation_id: Option<String>,
    /// The authoritative final text, when a `completed` event arrived.
    pub final_text: Option<String>,
}

/// A plugin-mode chat session against one bot.
pub struct ChatSession {
    api: ApiClient,
    device: Arc<dyn RobotDevice>,
    executor: PluginExecutor,
    conversations: Vec<Conversation>,
    bot_id: String,
}

impl ChatSession {
    pub fn new(api: ApiClient, device: Arc<dyn RobotDevice>, bot_id: impl Into<String>) -> Self {
        Self {
            api,
            device,
            executor: PluginExecutor::new(),
            conversations: Vec::new(),
            bot_id: bot_id.into(),
        }
    }

    /// Session against the real backend: the API client doubles as device.
    pub fn with_backend(api: ApiClient, bot_id: impl Into<String>) -> Self {
        let device = Arc::new(api.clone());
        Self::new(api, device, bot_id)
    }

    /// Current conversation snapshot (newest first).
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    /// Create a conversation on the backend and add it to the list.
    pub async fn create_conversation(&mut self, initial_message: Option<&str>) -> Result<String> {
        let messages: Vec<Message> = initial_message.map(Message::user).into_iter().collect();
        let created = self.api.create_conversation(&messages).await?.into_data()?;
        self.conversations = push_conversation(
            &self.conversations,
            Conversation::new(created.id.clone(), messages),
        );
        Ok(created.id)
    }

    /// Delete a conversation on the backend and drop its local state.
    pub async fn delete_conversation(&mut self, conversation_id: &str) -> Result<()> {
        self.api.delete_conversation(conversation_id).await?;
        self.conversations = remove_conversation(&self.conversations, conversation_id);
        self.executor.forget(conversation_id);
        Ok(())
    }

    /// Send one user message and drive the streaming turn to completion.
    ///
    /// Content deltas merge into the tail assistant bubble and are scanned
    /// for plugin calls; at `completed` the final text overwrites the bubble
    /// and the queued calls are deduplicated and executed serially, each
    /// appending its report to the transcript. A protocol `error` event or a
    /// transport failure surfaces as `Err`.
    pub async fn send(
        &mut self,
        text: &str,
        conversation_id: Option<&str>,
    ) -> Result<TurnOutcome> {
        if let Some(id) = conversation_id {
            self.conversations = append_message(&self.conversations, id, Message::user(text));
        }
        self.executor.begin_turn();

        let request = ChatStreamRequest::builder()
            .text(text)
            .bot_id(self.bot_id.clone())
            .maybe_user_id(self.api.config().user_id.clone())
            .maybe_conversation_id(conversation_id.map(String::from))
            .build();
        let mut events = self.api.stream_chat(&request, StreamMode::Plugins).await?;

        let mut current_id: Option<String> = conversation_id.map(String::from);
        let mut assistant_text = String::new();

        while let Some(event) = events.next().await {
            match event? {
                StreamEvent::ConversationId {
                    content: Some(id), ..
                } if !id.is_empty() => {
                    debug!(conversation_id = %id, "conversation id received");
                    self.executor.bind_conversation(&id);
                    if conversation_id.is_none()
                        && !self.conversations.iter().any(|c| c.id == id)
                    {
                        self.conversations = push_conversation(
                            &self.conversations,
                            Conversation::new(id.clone(), vec![Message::user(text)]),
                        );
                    }
                    current_id = Some(id);
                }
                StreamEvent::Content {
                    content: Some(chunk),
                    ..
                } if !chunk.is_empty() => {
                    if let Some(call) = parse_plugin_call(&chunk) {
                        self.executor.enqueue(current_id.as_deref(), call);
                    }
                    assistant_text.push_str(&chunk);
                    if let Some(id) = &current_id {
                        self.conversations =
                            apply_delta(&self.conversations, id, &assistant_text);
                    }
                }
                StreamEvent::Completed {
                    content: Some(final_text),
                    ..
                } if !final_text.is_empty() => {
                    // Safety net: a call emitted mid-stream appears verbatim
                    // in the final text; dedup makes the re-queue harmless.
                    if let Some(call) = parse_plugin_call(&final_text) {
                        self.executor.enqueue(current_id.as_deref(), call);
                    }
                    if let Some(id) = &current_id {
                        self.conversations = apply_final(&self.conversations, id, &final_text);
                        let reports = self
                            .executor
                            .drain_and_execute(id, self.device.as_ref())
                            .await;
                        for report in reports {
                            self.conversations = append_message(&self.conversations, id, report);
                        }
                    } else {
                        warn!("completed event with no conversation id; dropping turn state");
                    }
                    return Ok(TurnOutcome {
                        conversation_id: current_id,
                        final_text: Some(final_text),
                    });
                }
                StreamEvent::Error {
                    content,
                    error_code,
                    ..
                } => {
                    return Err(TurboPiError::Stream {
                        message: content.unwrap_or_else(|| "未知错误".to_string()),
                        error_code,
                    });
                }
                StreamEvent::Done { .. } => break,
                // conversation_id/content/completed without payload carry
                // nothing to act on.
                _ => {}
            }
        }

        Ok(TurnOutcome {
            conversation_id: current_id,
            final_text: None,
        })
    }
}
