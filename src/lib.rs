//! TurboPi — Rust client SDK for the TurboPi robot backend.
//!
//! Provides typed access to the device-control, camera, status, and Coze
//! conversation endpoints, plus the streaming core: an SSE protocol client,
//! a plugin (tool-call) extraction/deduplication/execution engine, and a
//! pure transcript reconciler.
//!
//! # Quick Start
//!
//! ```no_run
//! use turbopi::prelude::*;
//!
//! # async fn example() -> turbopi::error::Result<()> {
//! let api = ApiClient::new(ClientConfig::from_env());
//! let mut session = ChatSession::with_backend(api, "bot_7");
//! let outcome = session.send("向前走", None).await?;
//! println!("{:?}", outcome.final_text);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod plugins;
pub mod prelude;
pub mod session;
pub mod stream;
pub mod transcript;
