use axum::{
    extract::FromRequestParts,
    http::{header::USER_AGENT, request::Parts, HeaderMap},
};
use domain::audit::{self, RequestMeta};
use std::convert::Infallible;

/// Caller IP and user agent, recorded with audit log entries.
pub(crate) struct ClientMeta(pub RequestMeta);

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

impl<S> FromRequestParts<S> for ClientMeta
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let headers = &parts.headers;

        Ok(ClientMeta(RequestMeta {
            ip_address: audit::client_ip(
                header(headers, "x-forwarded-for"),
                header(headers, "x-real-ip"),
            ),
            user_agent: headers
                .get(USER_AGENT)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string),
        }))
    }
}
