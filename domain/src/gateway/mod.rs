//! Clients for the third-party HTTP services the domain calls out to.
//!
//! Every client makes exactly one attempt per call; non-success responses are
//! logged with their body and surfaced as errors.

pub mod llm;
pub mod stripe;
pub mod transcription;
pub mod workflow;

use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use log::*;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

/// Default headers carrying `Authorization: Bearer <token>`, marked sensitive.
pub(crate) fn bearer_headers(token: &str) -> Result<HeaderMap, Error> {
    let mut headers = HeaderMap::new();

    let mut header_value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
        warn!("Failed to create auth header: {:?}", e);
        Error {
            source: Some(Box::new(e)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                "Invalid API key format".to_string(),
            )),
        }
    })?;
    header_value.set_sensitive(true);
    headers.insert(AUTHORIZATION, header_value);

    Ok(headers)
}
