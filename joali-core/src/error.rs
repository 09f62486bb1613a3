//! Error types surfaced by the API façade

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received (connection refused, timeout, TLS failure)
    #[error("HTTP request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx response; `message` is taken from the backend payload or a fallback
    #[error("{message}")]
    Status { status: u16, message: String },

    /// 401 that could not be recovered by a token refresh
    #[error("{message}")]
    Unauthorized { message: String },

    #[error("No access token found")]
    NoAccessToken,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl ApiError {
    /// HTTP status code carried by the error, if a response was received
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Unauthorized { .. } => Some(401),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}
