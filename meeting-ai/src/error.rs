//! Error types for meeting AI operations.

use std::fmt;

/// Error type shared by agents and extraction providers.
///
/// Provider implementations map their native failures onto these variants so
/// callers can decide between falling back and failing without inspecting
/// provider-specific details.
#[derive(Debug)]
pub enum Error {
    /// The provider rejected the configured API key.
    Authentication(String),

    /// Connection failures, DNS errors, or timeouts reaching the provider.
    Network(String),

    /// A required setting (API URL, key) is absent.
    Configuration(String),

    /// The provider answered with a non-success status.
    Provider(String),

    /// The provider answered, but the body could not be turned into action items.
    InvalidResponse(String),

    /// The agent was invoked without the identifiers it needs.
    InvalidContext(String),

    /// Catch-all for errors that don't fit other categories.
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Authentication(msg) => write!(f, "Authentication failed: {}", msg),
            Error::Network(msg) => write!(f, "Network error: {}", msg),
            Error::Configuration(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::Provider(msg) => write!(f, "Provider error: {}", msg),
            Error::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            Error::InvalidContext(msg) => write!(f, "{}", msg),
            Error::Other(err) => write!(f, "Other error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidResponse(err.to_string())
    }
}
