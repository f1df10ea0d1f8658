//! Error types for the scheduler client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to the scheduler
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Scheduler returned an error status code
    #[error("scheduler error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the scheduler
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// No scheduler host is configured
    #[error("no scheduler hosts configured")]
    NoHosts,
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Whether the error is likely to clear up on its own
    ///
    /// Unreachable or timed-out hosts and 5xx responses are transient;
    /// rejected requests and unparsable responses are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RequestFailed(e) => e.is_connect() || e.is_timeout(),
            Self::ApiError { status, .. } => *status >= 500,
            Self::NoHosts => true,
            Self::ParseError(_) | Self::NotFound(_) => false,
        }
    }
}
