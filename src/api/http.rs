//! Shared HTTP clients, response envelope, and error normalization.

use std::sync::OnceLock;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::REQUEST_TIMEOUT;
use crate::error::TurboPiError;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
static STREAMING_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared client for non-streaming requests.
pub(crate) fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .pool_max_idle_per_host(4)
            .build()
            .expect("Failed to build HTTP client")
    })
}

/// Get (or create) the client for SSE requests.
///
/// No overall timeout: a chat stream stays open for as long as the model
/// generates. Only the connection attempt is bounded.
pub(crate) fn streaming_client() -> &'static reqwest::Client {
    STREAMING_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .connect_timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build streaming HTTP client")
    })
}

/// Default headers for a JSON request, including a fresh `X-Trace-ID`.
pub(crate) fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(&uuid::Uuid::new_v4().to_string()) {
        headers.insert("x-trace-id", val);
    }
    headers
}

/// Headers for an SSE request.
pub(crate) fn sse_headers() -> HeaderMap {
    let mut headers = json_headers();
    headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
    headers
}

/// Unified success envelope returned by every non-streaming endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub trace_id: String,
    #[serde(default)]
    pub mode: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Unwrap the payload, turning a missing `data` field into an API error.
    pub fn into_data(self) -> Result<T, TurboPiError> {
        self.data.ok_or_else(|| TurboPiError::Api {
            status: 200,
            message: format!("response missing data field: {}", self.message),
            code: Some(self.code),
            trace_id: Some(self.trace_id),
        })
    }
}

/// Backend error payload, as nested by FastAPI under `detail`.
#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    trace_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    detail: Option<ErrorDetail>,
}

/// Normalize a non-2xx response body into an API error.
///
/// The backend wraps errors as `{"detail": {code, message, trace_id, ...}}`;
/// bare `{code, message}` bodies and non-JSON bodies are tolerated.
pub(crate) fn response_error(status: u16, body: &str) -> TurboPiError {
    let detail = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.detail)
        .or_else(|| serde_json::from_str::<ErrorDetail>(body).ok());

    match detail {
        Some(d) => TurboPiError::Api {
            status,
            message: d.message.unwrap_or_else(|| format!("HTTP {status}")),
            code: d.code,
            trace_id: d.trace_id,
        },
        None => TurboPiError::api(
            status,
            if body.trim().is_empty() {
                format!("HTTP {status}")
            } else {
                body.trim().chars().take(200).collect::<String>()
            },
        ),
    }
}

/// Map a transport failure, distinguishing timeouts from other network errors.
pub(crate) fn transport_error(err: reqwest::Error) -> TurboPiError {
    if err.is_timeout() {
        TurboPiError::Timeout(REQUEST_TIMEOUT.as_millis() as u64)
    } else {
        TurboPiError::Network(err)
    }
}

/// Decode a response: non-2xx goes through [`response_error`].
pub(crate) async fn decode_response<T: DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<ApiResponse<T>, TurboPiError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(response_error(status.as_u16(), &body));
    }
    resp.json::<ApiResponse<T>>().await.map_err(transport_error)
}
