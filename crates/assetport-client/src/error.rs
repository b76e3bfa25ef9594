//! Error types for the assetport client

use assetport_api::ValidationError;
use thiserror::Error;

use crate::http::RateLimitInfo;

/// Errors that can occur when using the assetport client
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Local data failed validation before anything was sent
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Invalid combination of arguments or client settings
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Credentials were rejected (401/403)
    #[error("Authentication failed ({status}): {message}")]
    Auth {
        /// HTTP status code
        status: u16,
        /// Error message from server
        message: String,
    },

    /// The server refused the request because a rate limit was hit (429)
    #[error("Rate limited: {message}")]
    RateLimited {
        /// Seconds to wait, from `Retry-After`
        retry_after: Option<u64>,
        /// Usage counters reported with the response
        usage: RateLimitInfo,
        /// Error message from server
        message: String,
    },

    /// API returned a 4xx error status
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from server
        message: String,
    },

    /// API returned a 5xx error status
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message from server
        message: String,
    },

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Local I/O failed while preparing a request
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// HTTP status reported by the server, if the error came from a response
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Auth { status, .. }
            | ClientError::Api { status, .. }
            | ClientError::Server { status, .. } => Some(*status),
            ClientError::RateLimited { .. } => Some(429),
            ClientError::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if repeating the same request later could succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::RateLimited { .. } | ClientError::Server { .. } => true,
            ClientError::Http(err) => err.is_timeout() || err.is_connect(),
            _ => false,
        }
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
