//! Stream event model.
//!
//! The backend pushes newline-delimited `data: <json>` records; each payload
//! deserializes into one [`StreamEvent`]. Unknown `type` values reject the
//! record at the parse boundary, extra fields are ignored.

use serde::{Deserialize, Serialize};

/// One event of a chat stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Announces the conversation id for this turn. Ordering with respect to
    /// `content` events is not guaranteed.
    ConversationId {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trace_id: Option<String>,
    },
    /// Incremental assistant text.
    Content {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trace_id: Option<String>,
    },
    /// The authoritative final text for the turn. A caller-visible break
    /// point, but not terminal by itself.
    Completed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trace_id: Option<String>,
    },
    /// Protocol-level error; terminal.
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error_code: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trace_id: Option<String>,
    },
    /// End of stream; terminal.
    Done {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trace_id: Option<String>,
    },
}

impl StreamEvent {
    /// Whether this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done { .. } | Self::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_variant() {
        let ev: StreamEvent =
            serde_json::from_str(r#"{"type":"conversation_id","content":"conv_1"}"#).unwrap();
        assert_eq!(
            ev,
            StreamEvent::ConversationId {
                content: Some("conv_1".into()),
                trace_id: None
            }
        );

        let ev: StreamEvent =
            serde_json::from_str(r#"{"type":"content","content":"你好","trace_id":"t-1"}"#)
                .unwrap();
        assert!(matches!(ev, StreamEvent::Content { .. }));

        let ev: StreamEvent = serde_json::from_str(r#"{"type":"done"}"#).unwrap();
        assert!(ev.is_terminal());

        let ev: StreamEvent =
            serde_json::from_str(r#"{"type":"error","content":"boom","error_code":"E42"}"#)
                .unwrap();
        assert!(ev.is_terminal());
    }

    #[test]
    fn completed_is_not_terminal() {
        let ev: StreamEvent =
            serde_json::from_str(r#"{"type":"completed","content":"final"}"#).unwrap();
        assert!(!ev.is_terminal());
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(serde_json::from_str::<StreamEvent>(r#"{"type":"heartbeat"}"#).is_err());
    }

    #[test]
    fn extra_fields_are_ignored() {
        let ev: StreamEvent = serde_json::from_str(
            r#"{"type":"content","content":"x","logid":"abc","seq":7}"#,
        )
        .unwrap();
        assert!(matches!(ev, StreamEvent::Content { .. }));
    }
}
