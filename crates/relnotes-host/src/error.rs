//! Host client error types

use thiserror::Error;

/// Result type alias using HostError
pub type Result<T> = std::result::Result<T, HostError>;

/// Host-related errors
#[derive(Debug, Error)]
pub enum HostError {
    /// The requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or invalid credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Credentials lack access to the resource
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Rate limited by the host
    #[error("Rate limited, resets at {reset:?}")]
    RateLimited { reset: Option<u64> },

    /// Other API error from the host
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The host answered with something we cannot use
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Client misconfiguration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HostError {
    /// Whether this error rejects an owner/repo pair outright.
    ///
    /// Only meaningful for repository-level requests.
    pub fn is_repository_fatal(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::Unauthorized(_) | Self::Forbidden(_)
        )
    }

    /// Whether this error means the resource is absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
