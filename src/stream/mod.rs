//! Streaming-event protocol client: SSE parsing and event demultiplexing.

pub mod client;
pub mod event;
pub mod sse;

pub use client::{EventStream, StreamMode};
pub use event::StreamEvent;
pub use sse::SseLineBuffer;
