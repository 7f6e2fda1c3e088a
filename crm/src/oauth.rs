//! GoHighLevel OAuth helpers used while connecting an account.

use chrono::{DateTime, Duration, Utc};
use log::*;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::adapters::ghl::{GhlConfig, API_VERSION};
use crate::error::{Error, ErrorKind};

/// Scopes requested when an organization connects GoHighLevel.
pub const GHL_SCOPES: &str = "tasks.write notes.write contacts.read";

/// Token payload returned by the GoHighLevel token endpoint for both grants.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
}

impl TokenResponse {
    pub(crate) fn expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.expires_in.map(|seconds| now + Duration::seconds(seconds))
    }
}

#[derive(Debug, Serialize)]
struct TokenExchangeRequest<'a> {
    grant_type: &'a str,
    code: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    redirect_uri: &'a str,
}

/// Tokens obtained from the authorization-code exchange.
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub access_token: SecretString,
    pub refresh_token: Option<SecretString>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct LocationResponse {
    location: Option<Location>,
}

#[derive(Debug, Deserialize)]
struct Location {
    name: Option<String>,
}

pub struct GhlOAuthClient {
    client: reqwest::Client,
    config: GhlConfig,
}

impl GhlOAuthClient {
    pub fn new(config: GhlConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder().use_rustls_tls().build()?;
        Ok(Self { client, config })
    }

    fn client_id(&self) -> Result<&str, Error> {
        self.config
            .client_id
            .as_deref()
            .ok_or_else(|| Error::new(ErrorKind::Config("GHL client ID not configured".into())))
    }

    /// URL of the vendor consent screen the browser is redirected to.
    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> Result<String, Error> {
        let client_id = self.client_id()?;

        Ok(format!(
            "{}?\
            response_type=code&\
            redirect_uri={}&\
            client_id={}&\
            scope={}&\
            state={}",
            self.config.authorize_url,
            urlencoding::encode(redirect_uri),
            urlencoding::encode(client_id),
            urlencoding::encode(GHL_SCOPES),
            urlencoding::encode(state)
        ))
    }

    /// Exchange an authorization code for access and refresh tokens.
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenGrant, Error> {
        let client_id = self.client_id()?;
        let client_secret = self.config.client_secret.as_deref().ok_or_else(|| {
            Error::new(ErrorKind::Config("GHL client secret not configured".into()))
        })?;

        let request = TokenExchangeRequest {
            grant_type: "authorization_code",
            code,
            client_id,
            client_secret,
            redirect_uri,
        };

        debug!("Exchanging GoHighLevel OAuth code for tokens");

        let response = self
            .client
            .post(&self.config.token_url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("GoHighLevel token exchange failed ({status}): {body}");
            return Err(Error::new(ErrorKind::Upstream {
                status: status.as_u16(),
                body,
            }));
        }

        let tokens: TokenResponse = response.json().await?;
        info!("Successfully exchanged GoHighLevel OAuth code for tokens");

        Ok(TokenGrant {
            expires_at: tokens.expires_at(Utc::now()),
            access_token: SecretString::from(tokens.access_token),
            refresh_token: tokens.refresh_token.map(SecretString::from),
        })
    }

    /// Display name of a location, when the vendor reports one.
    pub async fn fetch_location_name(
        &self,
        access_token: &SecretString,
        location_id: &str,
    ) -> Result<Option<String>, Error> {
        let url = format!(
            "{}/locations/{}",
            self.config.api_base_url,
            urlencoding::encode(location_id)
        );

        let response = self
            .client
            .get(url)
            .bearer_auth(access_token.expose_secret())
            .header("Version", API_VERSION)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::new(ErrorKind::Upstream {
                status: status.as_u16(),
                body,
            }));
        }

        let location: LocationResponse = response.json().await?;
        Ok(location.location.and_then(|l| l.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn config(server_url: &str) -> GhlConfig {
        GhlConfig {
            api_base_url: server_url.to_string(),
            token_url: format!("{server_url}/oauth/token"),
            authorize_url: "https://marketplace.example.com/oauth/chooselocation".to_string(),
            client_id: Some("client-123".to_string()),
            client_secret: Some("secret-456".to_string()),
        }
    }

    #[test]
    fn authorization_url_carries_scopes_and_state() {
        let client = GhlOAuthClient::new(config("http://localhost")).unwrap();

        let url = client
            .authorization_url("http://app.test/crm/ghl/callback", "state-token")
            .unwrap();

        assert!(url.starts_with("https://marketplace.example.com/oauth/chooselocation?"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("scope=tasks.write%20notes.write%20contacts.read"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Fapp.test%2Fcrm%2Fghl%2Fcallback"));
        assert!(url.contains("state=state-token"));
    }

    #[test]
    fn authorization_url_requires_client_id() {
        let mut config = config("http://localhost");
        config.client_id = None;
        let client = GhlOAuthClient::new(config).unwrap();

        let err = client.authorization_url("http://app.test", "s").unwrap_err();
        assert_eq!(err.to_string(), "GHL client ID not configured");
    }

    #[tokio::test]
    async fn exchange_code_posts_authorization_code_grant() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth/token")
            .match_body(Matcher::Json(json!({
                "grant_type": "authorization_code",
                "code": "code-1",
                "client_id": "client-123",
                "client_secret": "secret-456",
                "redirect_uri": "http://app.test/crm/ghl/callback"
            })))
            .with_status(200)
            .with_body(
                json!({
                    "access_token": "new-access",
                    "refresh_token": "new-refresh",
                    "expires_in": 86399
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = GhlOAuthClient::new(config(&server.url())).unwrap();
        let grant = client
            .exchange_code("code-1", "http://app.test/crm/ghl/callback")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(grant.access_token.expose_secret(), "new-access");
        assert!(grant.expires_at.is_some());
    }

    #[tokio::test]
    async fn exchange_code_surfaces_upstream_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/oauth/token")
            .with_status(400)
            .with_body("invalid_grant")
            .create_async()
            .await;

        let client = GhlOAuthClient::new(config(&server.url())).unwrap();
        let err = client.exchange_code("bad", "http://app.test").await.unwrap_err();

        assert_eq!(
            err.error_kind,
            ErrorKind::Upstream {
                status: 400,
                body: "invalid_grant".to_string()
            }
        );
    }

    #[tokio::test]
    async fn fetch_location_name_reads_nested_name() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/locations/loc-1")
            .match_header("authorization", "Bearer token")
            .match_header("version", API_VERSION)
            .with_status(200)
            .with_body(json!({ "location": { "name": "Acme HQ" } }).to_string())
            .create_async()
            .await;

        let client = GhlOAuthClient::new(config(&server.url())).unwrap();
        let name = client
            .fetch_location_name(&SecretString::from("token".to_string()), "loc-1")
            .await
            .unwrap();

        assert_eq!(name.as_deref(), Some("Acme HQ"));
    }
}
