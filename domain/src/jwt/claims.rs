//! Claims carried by the tokens this service verifies or issues.

use serde::{Deserialize, Serialize};

/// Claims of the auth provider's access token that the service relies on.
///
/// The audience is validated by `jsonwebtoken` against the raw claims, so it
/// is not modeled here (providers send it as a string or an array).
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AccessTokenClaims {
    pub sub: String,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Claims of the `state` parameter round-tripped through the CRM OAuth consent screen.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct OAuthStateClaims {
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
    pub user_id: String,
    pub organization_id: String,
}
