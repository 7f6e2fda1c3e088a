//! CRM connections: OAuth connect/callback, status, disconnect, and the
//! database-backed `ConnectionStore` the CRM adapters persist tokens through.

use crate::audit::{self, AuditAction, AuditEvent, RequestMeta};
use crate::crm_connections::Model;
use crate::crm_type::CrmType;
use crate::error::Error;
use crate::jwt;
use crate::Id;
use async_trait::async_trait;
use chrono::Utc;
use crm::adapters::ghl::GhlConfig;
use crm::error::storage_error;
use crm::oauth::GhlOAuthClient;
use crm::{Connection, ConnectionStore, ErrorKind, RefreshedTokens};

pub use crm::CrmManager;
use entity_api::crm_connection::{self, NewConnection};
use log::*;
use sea_orm::{DatabaseConnection, TransactionTrait};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::json;
use service::config::Config;
use std::sync::Arc;

/// Account name stored when the vendor does not report one.
pub const DEFAULT_GHL_ACCOUNT_NAME: &str = "GoHighLevel";

/// `ConnectionStore` over the `crm_connections` table.
pub struct DbConnectionStore {
    db: Arc<DatabaseConnection>,
}

impl DbConnectionStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn to_connection(model: Model) -> Connection {
    Connection {
        id: model.id,
        organization_id: model.organization_id,
        crm_type: model.crm_type,
        access_token: SecretString::from(model.access_token),
        refresh_token: model.refresh_token.map(SecretString::from),
        token_expires_at: model.token_expires_at.map(|dt| dt.with_timezone(&Utc)),
        account_id: model.account_id,
        account_name: model.account_name,
    }
}

#[async_trait]
impl ConnectionStore for DbConnectionStore {
    async fn find_active(
        &self,
        organization_id: Id,
        crm_type: CrmType,
    ) -> Result<Option<Connection>, crm::Error> {
        crm_connection::find_active(&self.db, organization_id, crm_type)
            .await
            .map(|model| model.map(to_connection))
            .map_err(|err| storage_error(err.to_string()))
    }

    async fn update_tokens(
        &self,
        connection: &Connection,
        tokens: &RefreshedTokens,
    ) -> Result<(), crm::Error> {
        crm_connection::update_tokens(
            &self.db,
            connection.organization_id,
            connection.id,
            tokens.access_token.expose_secret().to_string(),
            tokens
                .refresh_token
                .as_ref()
                .map(|token| token.expose_secret().to_string()),
            tokens.token_expires_at,
        )
        .await
        .map(|_| ())
        .map_err(|err| storage_error(err.to_string()))
    }
}

pub fn ghl_config(config: &Config) -> GhlConfig {
    GhlConfig {
        api_base_url: config.ghl_api_base_url().to_string(),
        token_url: config.ghl_token_url().to_string(),
        authorize_url: config.ghl_authorize_url().to_string(),
        client_id: config.ghl_client_id(),
        client_secret: config.ghl_client_secret(),
    }
}

/// Builds the manager with one adapter per supported vendor, all sharing the
/// database-backed store.
pub fn crm_manager(config: &Config, db: Arc<DatabaseConnection>) -> Result<CrmManager, Error> {
    let store: Arc<dyn ConnectionStore> = Arc::new(DbConnectionStore::new(db));
    Ok(CrmManager::from_config(ghl_config(config), store)?)
}

fn redirect_uri(config: &Config) -> String {
    format!("{}/crm/ghl/callback", config.app_base_url())
}

/// Vendor consent URL carrying a signed `state` that identifies the caller.
pub fn connect_url(config: &Config, user_id: Id, organization_id: Id) -> Result<String, Error> {
    let client = GhlOAuthClient::new(ghl_config(config))?;
    let state = jwt::issue_oauth_state(config, user_id, organization_id)?;

    Ok(client.authorization_url(&redirect_uri(config), &state)?)
}

/// Where the browser ends up after the OAuth callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    Connected,
    MissingParameters,
    InvalidState,
    TokenExchangeFailed,
    SaveFailed,
    Failed,
}

impl CallbackOutcome {
    /// Path relative to the public app URL.
    pub fn redirect_path(&self) -> &'static str {
        match self {
            CallbackOutcome::Connected => "/dashboard?success=ghl_connected",
            CallbackOutcome::MissingParameters => "/dashboard?error=ghl_auth_failed",
            CallbackOutcome::InvalidState => "/auth/login",
            CallbackOutcome::TokenExchangeFailed => "/dashboard?error=ghl_token_exchange_failed",
            CallbackOutcome::SaveFailed => "/dashboard?error=ghl_save_failed",
            CallbackOutcome::Failed => "/dashboard?error=ghl_callback_failed",
        }
    }
}

/// Query parameters GoHighLevel sends back to the callback.
#[derive(Debug, Clone, Default)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub location_id: Option<String>,
    pub state: Option<String>,
}

/// Exchanges the authorization code and stores the organization's new GHL
/// connection, replacing any active one.
pub async fn complete_callback(
    db: &DatabaseConnection,
    config: &Config,
    params: CallbackParams,
    meta: &RequestMeta,
) -> CallbackOutcome {
    let (Some(code), Some(location_id)) = (params.code, params.location_id) else {
        warn!("GHL callback without code or locationId");
        return CallbackOutcome::MissingParameters;
    };

    let state = match params
        .state
        .as_deref()
        .map(|state| jwt::verify_oauth_state(config, state))
    {
        Some(Ok(state)) => state,
        _ => {
            warn!("GHL callback with missing or invalid state");
            return CallbackOutcome::InvalidState;
        }
    };

    let client = match GhlOAuthClient::new(ghl_config(config)) {
        Ok(client) => client,
        Err(err) => {
            error!("GHL OAuth client unavailable: {err}");
            return CallbackOutcome::Failed;
        }
    };

    let grant = match client.exchange_code(&code, &redirect_uri(config)).await {
        Ok(grant) => grant,
        Err(err) => {
            error!("GHL token exchange failed: {err}");
            return CallbackOutcome::TokenExchangeFailed;
        }
    };

    let account_name = client
        .fetch_location_name(&grant.access_token, &location_id)
        .await
        .unwrap_or_else(|err| {
            warn!("Could not look up GHL location {location_id}: {err}");
            None
        })
        .unwrap_or_else(|| DEFAULT_GHL_ACCOUNT_NAME.to_string());

    let organization_id = state.organization_id;

    // Dropping `txn` without a commit rolls back the deactivation.
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(err) => {
            error!("Could not start transaction for GHL connection: {err}");
            return CallbackOutcome::Failed;
        }
    };

    if let Err(err) = crm_connection::deactivate(&txn, organization_id, CrmType::Ghl).await {
        error!("Could not deactivate previous GHL connections: {err}");
        return CallbackOutcome::Failed;
    }

    let new_connection = NewConnection {
        crm_type: CrmType::Ghl,
        access_token: grant.access_token.expose_secret().to_string(),
        refresh_token: grant
            .refresh_token
            .as_ref()
            .map(|token| token.expose_secret().to_string()),
        token_expires_at: grant.expires_at,
        account_id: Some(location_id.clone()),
        account_name: Some(account_name.clone()),
        metadata: Some(json!({ "locationId": location_id })),
    };

    let stored = match crm_connection::create(&txn, organization_id, new_connection).await {
        Ok(stored) => stored,
        Err(err) => {
            error!("Could not save GHL connection: {err}");
            return CallbackOutcome::SaveFailed;
        }
    };

    if let Err(err) = txn.commit().await {
        error!("Could not commit GHL connection: {err}");
        return CallbackOutcome::SaveFailed;
    }

    info!("Organization {organization_id} connected GHL location {location_id}");

    audit::log_event(
        db,
        AuditEvent::new(organization_id, Some(state.user_id), AuditAction::CrmConnected)
            .resource("crm_connection", stored.id)
            .details(json!({ "crmType": CrmType::Ghl, "accountName": account_name }))
            .meta(meta),
    )
    .await;

    CallbackOutcome::Connected
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub connected: bool,
    pub valid: bool,
    pub account_name: Option<String>,
}

/// Whether the organization has an active connection and the vendor still accepts it.
pub async fn status(
    manager: &CrmManager,
    organization_id: Id,
    crm_type: CrmType,
) -> Result<ConnectionStatus, Error> {
    let connection = match manager.active_connection(organization_id, crm_type).await {
        Ok(connection) => connection,
        Err(err) if matches!(err.error_kind, ErrorKind::NoActiveConnection(_)) => {
            return Ok(ConnectionStatus {
                connected: false,
                valid: false,
                account_name: None,
            })
        }
        Err(err) => return Err(err.into()),
    };

    let valid = manager
        .validate_connection(&connection)
        .await
        .unwrap_or_else(|err| {
            warn!("Validating {crm_type} connection {} failed: {err}", connection.id);
            false
        });

    Ok(ConnectionStatus {
        connected: true,
        valid,
        account_name: connection.account_name,
    })
}

/// Soft-disconnects the organization's active connections for `crm_type`.
pub async fn disconnect(
    db: &DatabaseConnection,
    organization_id: Id,
    user_id: Id,
    crm_type: CrmType,
    meta: &RequestMeta,
) -> Result<u64, Error> {
    let deactivated = crm_connection::deactivate(db, organization_id, crm_type).await?;

    audit::log_event(
        db,
        AuditEvent::new(organization_id, Some(user_id), AuditAction::CrmDisconnected)
            .details(json!({ "crmType": crm_type, "deactivated": deactivated }))
            .meta(meta),
    )
    .await;

    Ok(deactivated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_redirect_to_flagged_dashboard() {
        assert_eq!(
            CallbackOutcome::Connected.redirect_path(),
            "/dashboard?success=ghl_connected"
        );
        assert_eq!(CallbackOutcome::InvalidState.redirect_path(), "/auth/login");
        assert_eq!(
            CallbackOutcome::SaveFailed.redirect_path(),
            "/dashboard?error=ghl_save_failed"
        );
    }

    #[test]
    fn connect_url_carries_callback_and_state() {
        let config = Config::from_env()
            .set_auth_jwt_secret("test-secret")
            .set_ghl("https://ghl.example.com", "client-1", "shh");

        let url = connect_url(&config, Id::new_v4(), Id::new_v4()).unwrap();

        assert!(url.contains("client_id=client-1"));
        assert!(url.contains("crm%2Fghl%2Fcallback"));
        assert!(url.contains("&state=ey"));
    }

    #[cfg(feature = "mock")]
    mod db {
        use super::*;
        use mockito::Server;
        use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

        fn stored_connection(organization_id: Id) -> Model {
            let now = Utc::now();
            Model {
                id: Id::new_v4(),
                organization_id,
                crm_type: CrmType::Ghl,
                access_token: "at-1".to_string(),
                refresh_token: Some("rt-1".to_string()),
                token_expires_at: Some((now + chrono::Duration::hours(1)).into()),
                account_id: Some("loc-1".to_string()),
                account_name: Some("Main Street Office".to_string()),
                is_active: true,
                metadata: Some(json!({ "locationId": "loc-1" })),
                created_at: now.into(),
                updated_at: now.into(),
            }
        }

        #[tokio::test]
        async fn callback_without_code_makes_no_calls() {
            let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

            let outcome = complete_callback(
                &db,
                &Config::from_env(),
                CallbackParams {
                    code: None,
                    location_id: Some("loc-1".to_string()),
                    state: None,
                },
                &RequestMeta::default(),
            )
            .await;

            assert_eq!(outcome, CallbackOutcome::MissingParameters);
            assert!(db.into_transaction_log().is_empty());
        }

        #[tokio::test]
        async fn callback_with_forged_state_goes_to_login() {
            let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
            let config = Config::from_env().set_auth_jwt_secret("test-secret");

            let outcome = complete_callback(
                &db,
                &config,
                CallbackParams {
                    code: Some("code-1".to_string()),
                    location_id: Some("loc-1".to_string()),
                    state: Some("not-a-token".to_string()),
                },
                &RequestMeta::default(),
            )
            .await;

            assert_eq!(outcome, CallbackOutcome::InvalidState);
        }

        #[tokio::test]
        async fn callback_stores_connection_with_location_name() {
            let mut server = Server::new_async().await;
            let token_mock = server
                .mock("POST", "/oauth/token")
                .with_status(200)
                .with_body(r#"{"access_token":"at-1","refresh_token":"rt-1","expires_in":86399}"#)
                .expect(1)
                .create_async()
                .await;
            let location_mock = server
                .mock("GET", "/locations/loc-1")
                .with_status(200)
                .with_body(r#"{"location":{"name":"Main Street Office"}}"#)
                .create_async()
                .await;

            let organization_id = Id::new_v4();
            let config = Config::from_env()
                .set_auth_jwt_secret("test-secret")
                .set_ghl(&server.url(), "client-1", "shh");
            let state = jwt::issue_oauth_state(&config, Id::new_v4(), organization_id).unwrap();

            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results(vec![MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .append_query_results(vec![vec![stored_connection(organization_id)]])
                .append_query_errors(vec![sea_orm::DbErr::Custom("audit down".into())])
                .into_connection();

            let outcome = complete_callback(
                &db,
                &config,
                CallbackParams {
                    code: Some("code-1".to_string()),
                    location_id: Some("loc-1".to_string()),
                    state: Some(state),
                },
                &RequestMeta::default(),
            )
            .await;

            token_mock.assert_async().await;
            location_mock.assert_async().await;
            assert_eq!(outcome, CallbackOutcome::Connected);
        }

        #[tokio::test]
        async fn callback_save_failure_keeps_previous_connection_active() {
            let mut server = Server::new_async().await;
            let _token_mock = server
                .mock("POST", "/oauth/token")
                .with_status(200)
                .with_body(r#"{"access_token":"at-2","refresh_token":"rt-2","expires_in":86399}"#)
                .create_async()
                .await;
            let _location_mock = server
                .mock("GET", "/locations/loc-1")
                .with_status(200)
                .with_body(r#"{"location":{"name":"Main Street Office"}}"#)
                .create_async()
                .await;

            let config = Config::from_env()
                .set_auth_jwt_secret("test-secret")
                .set_ghl(&server.url(), "client-1", "shh");
            let state = jwt::issue_oauth_state(&config, Id::new_v4(), Id::new_v4()).unwrap();

            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results(vec![MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .append_query_errors(vec![sea_orm::DbErr::Custom("insert failed".into())])
                .into_connection();

            let outcome = complete_callback(
                &db,
                &config,
                CallbackParams {
                    code: Some("code-1".to_string()),
                    location_id: Some("loc-1".to_string()),
                    state: Some(state),
                },
                &RequestMeta::default(),
            )
            .await;

            assert_eq!(outcome, CallbackOutcome::SaveFailed);

            let log = db.into_transaction_log();
            assert_eq!(log.len(), 1);
            let statements: Vec<&str> = log[0]
                .statements()
                .iter()
                .map(|stmt| stmt.sql.as_str())
                .collect();
            assert_eq!(statements.first(), Some(&"BEGIN"));
            assert_eq!(statements.last(), Some(&"ROLLBACK"));
            assert!(!statements.contains(&"COMMIT"));
        }

        #[tokio::test]
        async fn callback_token_exchange_failure_is_flagged() {
            let mut server = Server::new_async().await;
            let _mock = server
                .mock("POST", "/oauth/token")
                .with_status(400)
                .with_body(r#"{"error":"invalid_grant"}"#)
                .create_async()
                .await;

            let config = Config::from_env()
                .set_auth_jwt_secret("test-secret")
                .set_ghl(&server.url(), "client-1", "shh");
            let state = jwt::issue_oauth_state(&config, Id::new_v4(), Id::new_v4()).unwrap();
            let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

            let outcome = complete_callback(
                &db,
                &config,
                CallbackParams {
                    code: Some("stale".to_string()),
                    location_id: Some("loc-1".to_string()),
                    state: Some(state),
                },
                &RequestMeta::default(),
            )
            .await;

            assert_eq!(outcome, CallbackOutcome::TokenExchangeFailed);
            assert!(db.into_transaction_log().is_empty());
        }

        #[tokio::test]
        async fn status_without_connection_is_disconnected() {
            let db = Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results::<Model, Vec<Model>, _>(vec![vec![]])
                    .into_connection(),
            );
            let manager = crm_manager(&Config::from_env(), db).unwrap();

            let status = status(&manager, Id::new_v4(), CrmType::Ghl).await.unwrap();

            assert_eq!(
                status,
                ConnectionStatus {
                    connected: false,
                    valid: false,
                    account_name: None
                }
            );
        }

        #[tokio::test]
        async fn status_reports_vendor_rejection_as_invalid() {
            let mut server = Server::new_async().await;
            let validate_mock = server
                .mock("GET", "/contacts/")
                .match_query(mockito::Matcher::Any)
                .with_status(401)
                .create_async()
                .await;

            let organization_id = Id::new_v4();
            let db = Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results(vec![vec![stored_connection(organization_id)]])
                    .into_connection(),
            );
            let config = Config::from_env().set_ghl(&server.url(), "client-1", "shh");
            let manager = crm_manager(&config, db).unwrap();

            let status = status(&manager, organization_id, CrmType::Ghl).await.unwrap();

            validate_mock.assert_async().await;
            assert!(status.connected);
            assert!(!status.valid);
            assert_eq!(status.account_name.as_deref(), Some("Main Street Office"));
        }

        #[tokio::test]
        async fn store_maps_rows_to_connections() {
            let organization_id = Id::new_v4();
            let row = stored_connection(organization_id);
            let store = DbConnectionStore::new(Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results(vec![vec![row.clone()]])
                    .into_connection(),
            ));

            let connection = store
                .find_active(organization_id, CrmType::Ghl)
                .await
                .unwrap()
                .unwrap();

            assert_eq!(connection.id, row.id);
            assert_eq!(connection.access_token.expose_secret(), "at-1");
            assert_eq!(connection.account_id.as_deref(), Some("loc-1"));
            assert!(!connection.needs_refresh(Utc::now()));
        }
    }
}
