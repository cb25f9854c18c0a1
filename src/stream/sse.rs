//! Incremental SSE record parser.
//!
//! Transport chunks arrive split at arbitrary byte positions; the buffer
//! retains the trailing partial line so records re-assemble exactly as if
//! each had arrived whole. Buffering is done in bytes and decoded per
//! complete line, so a chunk boundary inside a multi-byte codepoint cannot
//! corrupt the record.

use tracing::warn;

use super::event::StreamEvent;

const DATA_PREFIX: &str = "data: ";

/// Accumulates transport chunks and yields parsed events per complete line.
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    buffer: Vec<u8>,
}

impl SseLineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one transport chunk, returning every event completed by it.
    ///
    /// A line is a record only if it starts with `data: `; anything else
    /// (blank keep-alives, comments) is ignored. Records that fail to parse
    /// are logged and skipped without affecting the rest of the stream.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(line_end) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=line_end).collect();
            let line = String::from_utf8_lossy(&line[..line_end]);
            if let Some(event) = parse_record(line.trim()) {
                events.push(event);
            }
        }
        events
    }

    /// Whether a partial line is still pending.
    pub fn has_partial(&self) -> bool {
        !self.buffer.is_empty()
    }
}

fn parse_record(line: &str) -> Option<StreamEvent> {
    let payload = line.strip_prefix(DATA_PREFIX)?;
    match serde_json::from_str::<StreamEvent>(payload) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(%err, line, "skipping unparsable SSE record");
            None
        }
    }
}
