//! Client boundary error types.

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors produced by a chat-completion client.
///
/// An instrumented wrapper propagates these unchanged — a caller observes
/// the same failure it would have seen from the bare client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed before a response was produced.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The API returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
        /// Provider-specific error code.
        code: Option<String>,
        /// Whether this error can be retried.
        retryable: bool,
    },

    /// Client-specific error.
    #[error("{message}")]
    Other {
        /// Error description.
        message: String,
    },
}

impl ClientError {
    /// Whether this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|s| {
                        s == reqwest::StatusCode::TOO_MANY_REQUESTS || s.is_server_error()
                    })
            }
            Self::Api { retryable, .. } => *retryable,
            Self::Json(_) | Self::Other { .. } => false,
        }
    }

    /// Error category string for diagnostics.
    pub fn category(&self) -> &str {
        match self {
            Self::Http(_) => "network",
            Self::Json(_) => "parse",
            Self::Api { .. } => "api",
            Self::Other { .. } => "unknown",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
