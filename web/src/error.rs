use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use domain::error::{
    DomainErrorKind, EntityErrorKind, Error as DomainError, ExternalErrorKind, InternalErrorKind,
};

use log::*;

pub type Result<T> = core::result::Result<T, Error>;

const UNAUTHORIZED: &str = "Unauthorized";
const INTERNAL_SERVER_ERROR: &str = "Internal server error";

#[derive(Debug)]
pub enum Error {
    Domain(DomainError),
    Web(WebErrorKind),
}

/// Failures detected by the web layer before any domain call is made.
#[derive(Debug, PartialEq)]
pub enum WebErrorKind {
    Unauthenticated,
    /// The request body or query could not be read.
    Input(String),
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Domain(err) => Some(err),
            Error::Web(_) => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        match self {
            Error::Domain(err) => write!(fmt, "{err}"),
            Error::Web(kind) => write!(fmt, "{kind:?}"),
        }
    }
}

impl Error {
    pub(crate) fn unauthenticated() -> Self {
        Error::Web(WebErrorKind::Unauthenticated)
    }

    pub(crate) fn input(message: impl Into<String>) -> Self {
        Error::Web(WebErrorKind::Input(message.into()))
    }

    /// Status code and the message that is safe to show the client.
    fn status_and_message(&self) -> (StatusCode, String) {
        let kind = match self {
            Error::Web(WebErrorKind::Unauthenticated) => {
                return (StatusCode::UNAUTHORIZED, UNAUTHORIZED.to_string())
            }
            Error::Web(WebErrorKind::Input(msg)) => return (StatusCode::BAD_REQUEST, msg.clone()),
            Error::Domain(err) => &err.error_kind,
        };

        match kind {
            DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
                InternalErrorKind::Entity(entity_error_kind) => match entity_error_kind {
                    EntityErrorKind::Unauthenticated => {
                        (StatusCode::UNAUTHORIZED, UNAUTHORIZED.to_string())
                    }
                    EntityErrorKind::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
                    EntityErrorKind::Invalid => {
                        (StatusCode::BAD_REQUEST, "Invalid request".to_string())
                    }
                    EntityErrorKind::DbTransaction | EntityErrorKind::Other(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        INTERNAL_SERVER_ERROR.to_string(),
                    ),
                },
                InternalErrorKind::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
                InternalErrorKind::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                InternalErrorKind::InvalidTransition(msg) => (StatusCode::CONFLICT, msg.clone()),
                InternalErrorKind::Config(msg) | InternalErrorKind::Other(msg) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
                }
            },
            DomainErrorKind::External(external_error_kind) => match external_error_kind {
                ExternalErrorKind::Network
                | ExternalErrorKind::Upstream(_)
                | ExternalErrorKind::Other(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_SERVER_ERROR.to_string(),
                ),
            },
        }
    }
}

/// Every error body has the shape `{"error": "<message>"}`. Upstream and
/// database details only reach the log.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            error!("{status}: {self:?}");
        } else {
            debug!("{status}: {message}");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self::Domain(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn render(err: Error) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_is_bad_request_with_message() {
        let (status, body) = render(DomainError::validation("Meeting ID required").into()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Meeting ID required" }));
    }

    #[tokio::test]
    async fn unauthenticated_is_401() {
        let (status, body) = render(Error::unauthenticated()).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": "Unauthorized" }));
    }

    #[tokio::test]
    async fn named_not_found_keeps_its_message() {
        let (status, body) = render(DomainError::not_found("Meeting not found").into()).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Meeting not found");
    }

    #[tokio::test]
    async fn invalid_transition_is_conflict() {
        let err = DomainError::invalid_transition("Cannot move playbook run from completed to running");
        let (status, _) = render(err.into()).await;

        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn upstream_details_are_not_returned() {
        let err = DomainError::upstream("card_declined: your card was declined");
        let (status, body) = render(err.into()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn context_message_replaces_upstream_message() {
        let err = DomainError::upstream("No such price").with_context("Failed to create checkout session");
        let (status, body) = render(err.into()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to create checkout session");
    }
}
