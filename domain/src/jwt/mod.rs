//! JSON Web Token handling for the domain layer.
//!
//! Two kinds of tokens pass through here:
//! - access tokens minted by the external auth provider, verified on every
//!   authenticated request to identify the caller
//! - short-lived `state` tokens this service signs when it sends a browser to
//!   the CRM consent screen, verified again when the vendor redirects back
//!
//! Both are HS256 and signed with `AUTH_JWT_SECRET`.

use crate::error::{DomainErrorKind, EntityErrorKind, Error, InternalErrorKind};
use crate::Id;
use chrono::{Duration, Utc};
use claims::{AccessTokenClaims, OAuthStateClaims};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use service::config::Config;

pub(crate) mod claims;

/// Audience of the OAuth `state` tokens, distinct from any access-token audience.
pub const OAUTH_STATE_AUDIENCE: &str = "meetingmind:crm-oauth-state";

/// Lifetime of an OAuth `state` token.
pub const OAUTH_STATE_TTL_MINUTES: i64 = 10;

/// Identity recovered from a verified OAuth `state` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OAuthState {
    pub user_id: Id,
    pub organization_id: Id,
}

fn unauthenticated() -> Error {
    Error {
        source: None,
        error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(
            EntityErrorKind::Unauthenticated,
        )),
    }
}

fn signing_secret(config: &Config) -> Result<String, Error> {
    config.auth_jwt_secret().ok_or_else(|| {
        warn!("Failed to get auth JWT secret from config");
        Error::config("Auth JWT secret not configured")
    })
}

/// Verifies an auth-provider access token and returns the user id in its `sub` claim.
pub fn verify_access_token(config: &Config, token: &str) -> Result<Id, Error> {
    let secret = signing_secret(config)?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[config.auth_jwt_audience()]);

    let data = decode::<AccessTokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|err| {
        debug!("Rejected access token: {err}");
        Error::from(err)
    })?;

    Id::parse_str(&data.claims.sub).map_err(|_| {
        debug!("Access token subject is not a user id");
        unauthenticated()
    })
}

/// Signs a `state` token binding a CRM consent round-trip to the caller and their organization.
pub fn issue_oauth_state(config: &Config, user_id: Id, organization_id: Id) -> Result<String, Error> {
    let secret = signing_secret(config)?;
    let now = Utc::now();

    let claims = OAuthStateClaims {
        aud: OAUTH_STATE_AUDIENCE.to_string(),
        exp: (now + Duration::minutes(OAUTH_STATE_TTL_MINUTES)).timestamp(),
        iat: now.timestamp(),
        user_id: user_id.to_string(),
        organization_id: organization_id.to_string(),
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

pub fn verify_oauth_state(config: &Config, state: &str) -> Result<OAuthState, Error> {
    let secret = signing_secret(config)?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[OAUTH_STATE_AUDIENCE]);

    let data = decode::<OAuthStateClaims>(
        state,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;

    let user_id = Id::parse_str(&data.claims.user_id).map_err(|_| unauthenticated())?;
    let organization_id =
        Id::parse_str(&data.claims.organization_id).map_err(|_| unauthenticated())?;

    Ok(OAuthState {
        user_id,
        organization_id,
    })
}
