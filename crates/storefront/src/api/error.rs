use thiserror::Error;

/// Errors that can occur when talking to the remote API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The transport could not deliver the request.
    #[error("Transport error: {0}")]
    Transport(String),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The API rejected the session. The forced logout has already run.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found (HTTP 404).
    #[error("Not found: {}", .0.as_deref().unwrap_or("resource"))]
    NotFound(Option<String>),

    /// An authenticated call was attempted without a stored token.
    #[error("No authentication token found")]
    MissingToken,

    /// Any other non-success status.
    #[error("Server error {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Server {
        /// HTTP status code.
        status: u16,
        /// Message from the response body, if any.
        message: Option<String>,
    },
}

impl ApiError {
    /// The message the server put in the error body, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized(message) => Some(message.as_str()),
            Self::NotFound(message) | Self::Server { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Network and 5xx failures are worth reporting; client errors are not.
    #[must_use]
    pub const fn is_reportable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Transport(_) | Self::Parse(_) => true,
            Self::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
