use crate::{AppState, Error};
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use domain::{jwt, organizations, tenancy, user_profiles};
use log::*;

/// The caller, resolved from the bearer access token, and the organization
/// (tenant) every query of the request is scoped to.
pub(crate) struct AuthenticatedUser {
    pub profile: user_profiles::Model,
    pub organization: organizations::Model,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = Error;

    // Every failure (no header, bad or expired token, unknown user, user without
    // an organization) is reported to the client as a plain 401.
    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(|| {
            trace!("Request without bearer token");
            Error::unauthenticated()
        })?;

        let user_id = jwt::verify_access_token(&state.config, token).map_err(|err| {
            debug!("Access token rejected: {err}");
            Error::unauthenticated()
        })?;

        let (profile, organization) = tenancy::current_organization(state.db_conn_ref(), user_id)
            .await
            .map_err(|err| {
                if err.is_not_found() {
                    debug!("No organization for user {user_id}: {err}");
                } else {
                    warn!("Resolving organization of user {user_id} failed: {err:?}");
                }
                Error::unauthenticated()
            })?;

        Ok(AuthenticatedUser {
            profile,
            organization,
        })
    }
}
