//! Unified streaming chat client.
//!
//! `stream_chat` performs the HTTP request, then exposes the response body
//! as a finite, single-pass stream of [`StreamEvent`]s. The stream ends
//! after a `done`/`error` event or when the transport closes (implicit
//! done); dropping it releases the connection.

use futures::stream::BoxStream;
use futures::StreamExt;
use tracing::{debug, error};

use crate::api::http::{response_error, sse_headers, streaming_client, transport_error};
use crate::api::{ApiClient, ChatStreamRequest};
use crate::error::{Result, TurboPiError};

use super::event::StreamEvent;
use super::sse::SseLineBuffer;

/// Which stream-chat endpoint variant to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    /// Plain assistant chat.
    Plain,
    /// Backend routes tool-capable bots; tool-call payloads arrive embedded
    /// in the streamed text.
    Plugins,
}

impl StreamMode {
    pub fn path(self) -> &'static str {
        match self {
            Self::Plain => "/api/v1/coze/conversations/stream",
            Self::Plugins => "/api/v1/coze/conversations/stream/plugins",
        }
    }
}

/// A finite, single-pass stream of chat events.
pub type EventStream = BoxStream<'static, Result<StreamEvent>>;

impl ApiClient {
    /// Open a streaming chat turn.
    ///
    /// Transport failures and non-2xx responses surface here, before any
    /// event is yielded. Mid-stream transport errors terminate the stream
    /// with one `Err` item.
    pub async fn stream_chat(
        &self,
        request: &ChatStreamRequest,
        mode: StreamMode,
    ) -> Result<EventStream> {
        let url = self.url(mode.path());
        debug!(%url, bot_id = %request.bot_id, "opening chat stream");

        let resp = streaming_client()
            .post(&url)
            .headers(sse_headers())
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(response_error(status.as_u16(), &body));
        }

        let byte_stream = resp.bytes_stream();
        let stream = async_stream::stream! {
            let mut parser = SseLineBuffer::new();
            futures::pin_mut!(byte_stream);

            'read: while let Some(chunk) = byte_stream.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        yield Err(TurboPiError::Network(e));
                        break;
                    }
                };

                for event in parser.push(&chunk) {
                    if let StreamEvent::Error { content, error_code, .. } = &event {
                        error!(?content, ?error_code, "stream error event");
                    }
                    let terminal = event.is_terminal();
                    yield Ok(event);
                    if terminal {
                        break 'read;
                    }
                }
            }
            debug!("chat stream closed");
        };

        Ok(Box::pin(stream))
    }
}
