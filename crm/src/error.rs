//! Error types for the `crm` crate.
//!
//! Follows the same pattern as domain::error with a root Error struct and an error kind enum.

use entity::crm_type::CrmType;
use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for the crm crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    /// The organization has no active connection for this vendor.
    NoActiveConnection(CrmType),
    /// The vendor is not in the registry the manager was built with.
    NoAdapter(CrmType),
    /// The stored connection cannot be refreshed.
    MissingRefreshToken,
    /// The vendor could not be reached or the response could not be read.
    Http(String),
    /// The vendor answered with a non-success status.
    Upstream { status: u16, body: String },
    /// Reading or persisting a connection failed.
    Storage(String),
    /// Vendor client credentials are missing.
    Config(String),
}

impl Error {
    pub fn new(error_kind: ErrorKind) -> Self {
        Error {
            source: None,
            error_kind,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::NoActiveConnection(crm_type) => {
                write!(f, "No active {} connection found", crm_type)
            }
            ErrorKind::NoAdapter(crm_type) => write!(f, "No adapter found for {}", crm_type),
            ErrorKind::MissingRefreshToken => write!(f, "No refresh token available"),
            ErrorKind::Http(msg) => write!(f, "CRM request failed: {}", msg),
            ErrorKind::Upstream { status, body } => {
                write!(f, "CRM API error ({}): {}", status, body)
            }
            ErrorKind::Storage(msg) => write!(f, "CRM connection storage error: {}", msg),
            ErrorKind::Config(msg) => write!(f, "{}", msg),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error {
            error_kind: ErrorKind::Http(err.to_string()),
            source: Some(Box::new(err)),
        }
    }
}

/// Helper function to create storage errors.
pub fn storage_error(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::Storage(message.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_vendor() {
        assert_eq!(
            Error::new(ErrorKind::NoActiveConnection(CrmType::Ghl)).to_string(),
            "No active ghl connection found"
        );
        assert_eq!(
            Error::new(ErrorKind::NoAdapter(CrmType::Hubspot)).to_string(),
            "No adapter found for hubspot"
        );
        assert_eq!(
            Error::new(ErrorKind::MissingRefreshToken).to_string(),
            "No refresh token available"
        );
    }

    #[test]
    fn upstream_message_carries_body() {
        let err = Error::new(ErrorKind::Upstream {
            status: 422,
            body: "{\"message\":\"bad\"}".to_string(),
        });

        assert!(err.to_string().contains("{\"message\":\"bad\"}"));
    }
}
