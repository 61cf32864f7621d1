use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Body the API sends alongside non-2xx responses
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status
    #[error("server responded with {status}: {}", .message.as_deref().unwrap_or("no error message"))]
    Server {
        status: StatusCode,
        message: Option<String>,
    },
    /// The request never completed
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// A 2xx body that does not match the expected shape
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl ApiError {
    /// Build a `Server` error from the status and raw body of a failed response.
    pub fn from_response_body(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.trim().is_empty());

        ApiError::Server { status, message }
    }

    /// Message reported by the server, if this is a server failure that carried one
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Server { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self, ApiError::Server { .. })
    }
}
