//! Conversation transcript model and pure reconciliation functions.
//!
//! All mutation is expressed as `&[Conversation] -> Vec<Conversation>`
//! transitions over an immutable snapshot, so a render layer holding the
//! previous list never observes a torn intermediate state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Image,
}

/// A single transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One conversation with the bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(id: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            id: id.into(),
            messages,
            created_at: Utc::now(),
        }
    }
}

/// Merge a streaming delta into the tail assistant message.
///
/// `running_text` is the full concatenation so far for the current turn;
/// the tail assistant bubble is replaced with it, or a new one is appended
/// if the conversation does not end in an assistant message.
pub fn apply_delta(
    conversations: &[Conversation],
    conversation_id: &str,
    running_text: &str,
) -> Vec<Conversation> {
    replace_or_append_assistant(conversations, conversation_id, running_text)
}

/// Overwrite the tail assistant message with the authoritative final text.
///
/// Idempotent: applying the same final text twice leaves the state unchanged,
/// so a `completed` event safely finalizes a partially streamed bubble.
pub fn apply_final(
    conversations: &[Conversation],
    conversation_id: &str,
    final_text: &str,
) -> Vec<Conversation> {
    replace_or_append_assistant(conversations, conversation_id, final_text)
}

fn replace_or_append_assistant(
    conversations: &[Conversation],
    conversation_id: &str,
    text: &str,
) -> Vec<Conversation> {
    conversations
        .iter()
        .map(|conv| {
            if conv.id != conversation_id {
                return conv.clone();
            }
            let mut conv = conv.clone();
            match conv.messages.last_mut() {
                Some(last) if last.role == Role::Assistant => last.content = text.to_string(),
                _ => conv.messages.push(Message::assistant(text)),
            }
            conv
        })
        .collect()
}

/// Append a message to the end of one conversation.
pub fn append_message(
    conversations: &[Conversation],
    conversation_id: &str,
    message: Message,
) -> Vec<Conversation> {
    conversations
        .iter()
        .map(|conv| {
            if conv.id != conversation_id {
                return conv.clone();
            }
            let mut conv = conv.clone();
            conv.messages.push(message.clone());
            conv
        })
        .collect()
}

/// Prepend a newly created conversation (newest first, as the console lists them).
pub fn push_conversation(
    conversations: &[Conversation],
    conversation: Conversation,
) -> Vec<Conversation> {
    let mut next = Vec::with_capacity(conversations.len() + 1);
    next.push(conversation);
    next.extend(conversations.iter().cloned());
    next
}

/// Drop a conversation by id.
pub fn remove_conversation(conversations: &[Conversation], conversation_id: &str) -> Vec<Conversation> {
    conversations
        .iter()
        .filter(|conv| conv.id != conversation_id)
        .cloned()
        .collect()
}
