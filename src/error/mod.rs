//! Error types for the TurboPi client.

use thiserror::Error;

/// Primary error type for all TurboPi client operations.
#[derive(Error, Debug)]
pub enum TurboPiError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api {
        status: u16,
        message: String,
        code: Option<String>,
        trace_id: Option<String>,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    #[error("Stream error: {message}")]
    Stream {
        message: String,
        error_code: Option<String>,
    },

    #[error("Plugin execution error: {plugin} — {message}")]
    PluginExecution { plugin: String, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl TurboPiError {
    /// Create an API error without backend-supplied details.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
            code: None,
            trace_id: None,
        }
    }

    /// HTTP status for API errors, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this error is potentially retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Api { status, .. } => matches!(status, 429 | 500..=599),
            _ => false,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, TurboPiError>;
