//! GitHub API Error Types
//!
//! Structured error handling for GitHub content operations. Maps HTTP
//! status codes to specific error variants for retry decisions and so
//! callers can tell a credential problem from a transient outage.

/// GitHub API error types
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 401/403. Never retried; the caller should prompt for re-authentication.
    #[error("authentication rejected (HTTP {status}): {body}")]
    Auth { status: u16, body: String },

    #[error("not found: {0}")]
    NotFound(String),

    /// 422. Triggers the create-vs-update transition on content writes;
    /// terminal everywhere else.
    #[error("validation conflict: {0}")]
    Conflict(String),

    #[error("client error (HTTP {status}): {body}")]
    Client { status: u16, body: String },

    /// The retry budget ran out. `last_status` is `None` when the failures
    /// were transport-level, so "server said no" stays distinguishable
    /// from "network said nothing".
    #[error("retry budget exhausted ({})", .last_status.map_or_else(|| "no response".to_string(), |s| format!("last status {}", s)))]
    RetryExhausted {
        last_status: Option<u16>,
        body: String,
    },

    /// A path that was expected to name a regular file names something else.
    #[error("not a regular file: {0}")]
    NotFile(String),

    /// Malformed or missing content in an otherwise successful response.
    #[error("malformed response payload: {0}")]
    Decode(String),

    /// Non-retryable transport failure (request construction, TLS, ...).
    #[error("network error: {0}")]
    Network(String),
}

impl ApiError {
    /// Create an ApiError from a terminal HTTP status and response body.
    ///
    /// Retryable statuses never reach this; the transport consumes them
    /// in its retry loop.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => ApiError::Auth { status, body },
            404 => ApiError::NotFound(body),
            422 => ApiError::Conflict(body),
            _ => ApiError::Client { status, body },
        }
    }

    /// Statuses the transport retries before giving up.
    pub fn is_retryable_status(status: u16) -> bool {
        matches!(status, 429 | 500 | 502 | 503 | 504)
    }

    /// Whether this failure means the credential itself was rejected.
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ApiError::Conflict(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}
