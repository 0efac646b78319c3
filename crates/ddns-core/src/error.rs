//! Error types for the DDNS client
//!
//! The reconciler distinguishes three failure families:
//! - transport failures ([`Error::Network`]) and unusable discovery answers
//!   ([`Error::InvalidIp`]), which the reconciler retries while resolving the IP
//! - provider failures ([`Error::Provider`]), which are fatal and carry the raw
//!   response body
//! - configuration failures ([`Error::Config`]), which are fatal at startup

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS client
#[derive(Error, Debug)]
pub enum Error {
    /// The request could not be sent or the endpoint was unreachable
    #[error("Network error: {0}")]
    Network(String),

    /// The discovery endpoint answered with something that is not a usable IP literal
    #[error("Invalid IP address: {0}")]
    InvalidIp(String),

    /// The provider was reachable but reported a failure
    #[error("Provider error ({provider}, status {}): {body}", display_status(.status))]
    Provider {
        /// Provider name
        provider: String,
        /// HTTP status, when the failure came with one
        status: Option<u16>,
        /// Raw response payload
        body: String,
    },

    /// Configuration missing, unreadable or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create an invalid IP error
    pub fn invalid_ip(msg: impl Into<String>) -> Self {
        Self::InvalidIp(msg.into())
    }

    /// Create a provider error from a failed response
    pub fn provider(provider: impl Into<String>, status: Option<u16>, body: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            status,
            body: body.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether a failure of IP resolution should be retried
    pub fn is_retryable_resolution(&self) -> bool {
        matches!(self, Self::Network(_) | Self::InvalidIp(_))
    }
}

fn display_status(status: &Option<u16>) -> String {
    status.map_or_else(|| "-".to_string(), |s| s.to_string())
}
