//! Error types for the LiveDNS updater
//!
//! Every component returns these as values; only the binary decides
//! whether an error ends the process.

use thiserror::Error;

/// Result type alias for LiveDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the LiveDNS updater
#[derive(Error, Debug)]
pub enum Error {
    /// Connection or read failure that survived every retry attempt
    #[error("Transport error after {attempts} attempt(s): {message}")]
    Transport {
        /// Number of attempts made before giving up
        attempts: u32,
        /// Description of the last failure
        message: String,
    },

    /// The remote end answered with a status the operation does not accept
    #[error("HTTP status {status} when trying to {operation}{}", format_provider_message(.message))]
    Provider {
        /// What we were doing (e.g. "get zone UUID")
        operation: String,
        /// HTTP status code returned
        status: u16,
        /// The provider's `message` field, when the body carried one
        message: Option<String>,
    },

    /// A response was received but lacked an expected field
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The IP echo service returned something unusable
    #[error("IP discovery error: {0}")]
    IpDiscovery(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

fn format_provider_message(message: &Option<String>) -> String {
    match message {
        Some(message) => format!(": {}", message),
        None => String::new(),
    }
}

impl Error {
    /// Create a transport error
    pub fn transport(attempts: u32, msg: impl Into<String>) -> Self {
        Self::Transport {
            attempts,
            message: msg.into(),
        }
    }

    /// Create a provider status error
    pub fn provider(operation: impl Into<String>, status: u16, message: Option<String>) -> Self {
        Self::Provider {
            operation: operation.into(),
            status,
            message,
        }
    }

    /// Create a malformed response error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Create an IP discovery error
    pub fn ip_discovery(msg: impl Into<String>) -> Self {
        Self::IpDiscovery(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Provider { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
