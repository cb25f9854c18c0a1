//! Coze conversation endpoints (`/api/v1/coze/conversations/*`).
//!
//! The streaming variants live in [`crate::stream::client`]; this module
//! covers conversation lifecycle and the request types shared with streaming.

use bon::Builder;
use serde::{Deserialize, Serialize};

use super::{ApiClient, ApiResponse};
use crate::error::Result;
use crate::transcript::Message;

/// Body for the stream-chat endpoints.
#[derive(Debug, Clone, Serialize, Builder)]
pub struct ChatStreamRequest {
    #[builder(into)]
    pub text: String,
    #[builder(into)]
    pub bot_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateConversationRequest<'a> {
    messages: &'a [Message],
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConversationCreated {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConversationDeleted {
    pub id: String,
    pub deleted: bool,
}

impl ApiClient {
    pub async fn create_conversation(
        &self,
        messages: &[Message],
    ) -> Result<ApiResponse<ConversationCreated>> {
        self.post_json(
            "/api/v1/coze/conversations/",
            &CreateConversationRequest { messages },
        )
        .await
    }

    pub async fn get_conversation(&self, id: &str) -> Result<ApiResponse<serde_json::Value>> {
        self.get(&format!("/api/v1/coze/conversations/{id}")).await
    }

    pub async fn delete_conversation(&self, id: &str) -> Result<ApiResponse<ConversationDeleted>> {
        self.delete(&format!("/api/v1/coze/conversations/{id}"))
            .await
    }
}
