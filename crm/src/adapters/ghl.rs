//! GoHighLevel adapter.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use entity::crm_type::CrmType;
use entity::priority::Priority;
use log::*;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;

use crate::adapter::Adapter;
use crate::connection::{Connection, CreatedRecord, CrmNote, CrmTask, RefreshedTokens};
use crate::error::{Error, ErrorKind};
use crate::oauth::TokenResponse;
use crate::storage::ConnectionStore;

/// Value of the `Version` header every GoHighLevel API call carries.
pub const API_VERSION: &str = "2021-07-28";

/// Endpoints and client credentials of the GoHighLevel marketplace app.
#[derive(Debug, Clone)]
pub struct GhlConfig {
    pub api_base_url: String,
    /// Used for both the authorization-code exchange and the refresh grant
    pub token_url: String,
    pub authorize_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskRequest<'a> {
    title: &'a str,
    body: Option<&'a str>,
    assigned_to: Option<&'a str>,
    due_date: Option<NaiveDate>,
    priority: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NoteRequest<'a> {
    body: &'a str,
    contact_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
}

/// GoHighLevel only distinguishes high, normal and low.
fn task_priority(priority: Priority) -> &'static str {
    match priority {
        Priority::Urgent | Priority::High => "high",
        Priority::Low => "low",
        Priority::Medium => "normal",
    }
}

/// Created records come back either wrapped (`{"task": {"id": ..}}`) or bare.
fn record_id(body: &Value, wrapper: &str) -> Option<String> {
    body.get(wrapper)
        .and_then(|inner| inner.get("id"))
        .or_else(|| body.get("id"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

pub struct GhlAdapter {
    client: reqwest::Client,
    config: GhlConfig,
    store: Arc<dyn ConnectionStore>,
}

impl GhlAdapter {
    pub fn new(config: GhlConfig, store: Arc<dyn ConnectionStore>) -> Result<Self, Error> {
        let client = reqwest::Client::builder().use_rustls_tls().build()?;

        Ok(Self {
            client,
            config,
            store,
        })
    }

    /// Returns the connection unchanged while its token is valid, otherwise refreshes it.
    async fn ensure_valid_token(&self, connection: &Connection) -> Result<Connection, Error> {
        if connection.needs_refresh(Utc::now()) {
            debug!(
                "GoHighLevel token for connection {} expired, refreshing",
                connection.id
            );
            self.refresh_token(connection).await
        } else {
            Ok(connection.clone())
        }
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        connection: &Connection,
        path: &str,
        body: &T,
    ) -> Result<Value, Error> {
        let connection = self.ensure_valid_token(connection).await?;

        let response = self
            .client
            .post(format!("{}{}", self.config.api_base_url, path))
            .bearer_auth(connection.access_token.expose_secret())
            .header("Version", API_VERSION)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("GoHighLevel API error on {path} ({status}): {body}");
            return Err(Error::new(ErrorKind::Upstream {
                status: status.as_u16(),
                body,
            }));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl Adapter for GhlAdapter {
    fn crm_type(&self) -> CrmType {
        CrmType::Ghl
    }

    async fn create_task(
        &self,
        connection: &Connection,
        task: &CrmTask,
    ) -> Result<CreatedRecord, Error> {
        let request = TaskRequest {
            title: &task.title,
            body: task.body.as_deref(),
            assigned_to: task.assigned_to.as_deref(),
            due_date: task.due_date,
            priority: task_priority(task.priority),
        };

        let body = self.post_json(connection, "/tasks/", &request).await?;

        let id = record_id(&body, "task").ok_or_else(|| {
            Error::new(ErrorKind::Http(
                "GoHighLevel task response did not include an id".into(),
            ))
        })?;
        info!("Created GoHighLevel task {id}");
        Ok(CreatedRecord { id })
    }

    async fn create_note(
        &self,
        connection: &Connection,
        note: &CrmNote,
    ) -> Result<CreatedRecord, Error> {
        let request = NoteRequest {
            body: &note.body,
            contact_id: note.contact_id.as_deref(),
        };

        let body = self.post_json(connection, "/notes/", &request).await?;

        let id = record_id(&body, "note").ok_or_else(|| {
            Error::new(ErrorKind::Http(
                "GoHighLevel note response did not include an id".into(),
            ))
        })?;
        info!("Created GoHighLevel note {id}");
        Ok(CreatedRecord { id })
    }

    async fn refresh_token(&self, connection: &Connection) -> Result<Connection, Error> {
        let refresh_token = connection
            .refresh_token
            .as_ref()
            .ok_or_else(|| Error::new(ErrorKind::MissingRefreshToken))?;

        let (Some(client_id), Some(client_secret)) = (
            self.config.client_id.as_deref(),
            self.config.client_secret.as_deref(),
        ) else {
            return Err(Error::new(ErrorKind::Config(
                "GHL client credentials not configured".into(),
            )));
        };

        let request = RefreshRequest {
            refresh_token: refresh_token.expose_secret(),
            grant_type: "refresh_token",
            client_id,
            client_secret,
        };

        let response = self
            .client
            .post(&self.config.token_url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("GoHighLevel token refresh failed ({status}): {body}");
            return Err(Error::new(ErrorKind::Upstream {
                status: status.as_u16(),
                body,
            }));
        }

        let tokens: TokenResponse = response.json().await?;
        let refreshed = RefreshedTokens {
            token_expires_at: tokens.expires_at(Utc::now()),
            access_token: SecretString::from(tokens.access_token),
            // Keep the current refresh token when the vendor does not rotate it
            refresh_token: tokens
                .refresh_token
                .map(SecretString::from)
                .or_else(|| connection.refresh_token.clone()),
        };

        self.store.update_tokens(connection, &refreshed).await?;
        info!("Refreshed GoHighLevel token for connection {}", connection.id);

        Ok(Connection {
            access_token: refreshed.access_token,
            refresh_token: refreshed.refresh_token,
            token_expires_at: refreshed.token_expires_at,
            ..connection.clone()
        })
    }

    async fn validate_connection(&self, connection: &Connection) -> Result<bool, Error> {
        let connection = match self.ensure_valid_token(connection).await {
            Ok(connection) => connection,
            Err(err) => {
                warn!("GoHighLevel connection {} cannot be refreshed: {err}", connection.id);
                return Ok(false);
            }
        };

        let mut request = self
            .client
            .get(format!("{}/contacts/", self.config.api_base_url))
            .bearer_auth(connection.access_token.expose_secret())
            .header("Version", API_VERSION);
        if let Some(location_id) = connection.account_id.as_deref() {
            request = request.query(&[("locationId", location_id)]);
        }

        match request.send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(err) => {
                warn!("GoHighLevel connection check failed: {err}");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;
    use chrono::{DateTime, Duration};
    use entity::Id;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn config(server_url: &str) -> GhlConfig {
        GhlConfig {
            api_base_url: server_url.to_string(),
            token_url: format!("{server_url}/oauth/token"),
            authorize_url: format!("{server_url}/oauth/chooselocation"),
            client_id: Some("client-123".to_string()),
            client_secret: Some("secret-456".to_string()),
        }
    }

    fn connection(token_expires_at: Option<DateTime<Utc>>) -> Connection {
        Connection {
            id: Id::new_v4(),
            organization_id: Id::new_v4(),
            crm_type: CrmType::Ghl,
            access_token: SecretString::from("old-access".to_string()),
            refresh_token: Some(SecretString::from("old-refresh".to_string())),
            token_expires_at,
            account_id: None,
            account_name: None,
        }
    }

    fn valid() -> Option<DateTime<Utc>> {
        Some(Utc::now() + Duration::hours(1))
    }

    #[test]
    fn priorities_map_to_vendor_levels() {
        assert_eq!(task_priority(Priority::Urgent), "high");
        assert_eq!(task_priority(Priority::High), "high");
        assert_eq!(task_priority(Priority::Medium), "normal");
        assert_eq!(task_priority(Priority::Low), "low");
    }

    #[test]
    fn record_id_reads_wrapped_or_bare_ids() {
        assert_eq!(
            record_id(&json!({ "task": { "id": "t1" } }), "task").as_deref(),
            Some("t1")
        );
        assert_eq!(record_id(&json!({ "id": "t2" }), "task").as_deref(), Some("t2"));
        assert_eq!(record_id(&json!({}), "task"), None);
    }

    #[tokio::test]
    async fn create_task_posts_vendor_body_with_headers() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/tasks/")
            .match_header("authorization", "Bearer old-access")
            .match_header("version", API_VERSION)
            .match_body(Matcher::Json(json!({
                "title": "Send contract",
                "body": "Draft is in the shared folder",
                "assignedTo": null,
                "dueDate": "2026-02-01",
                "priority": "high"
            })))
            .with_status(201)
            .with_body(json!({ "task": { "id": "task-1" } }).to_string())
            .create_async()
            .await;

        let store = Arc::new(MemoryStore::default());
        let adapter = GhlAdapter::new(config(&server.url()), store.clone()).unwrap();
        let task = CrmTask {
            title: "Send contract".to_string(),
            body: Some("Draft is in the shared folder".to_string()),
            assigned_to: None,
            due_date: NaiveDate::from_ymd_opt(2026, 2, 1),
            priority: Priority::Urgent,
        };

        let created = adapter.create_task(&connection(valid()), &task).await.unwrap();

        mock.assert_async().await;
        assert_eq!(created.id, "task-1");
        assert!(store.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn expired_token_is_refreshed_and_persisted_before_the_call() {
        let mut server = Server::new_async().await;
        let refresh = server
            .mock("POST", "/oauth/token")
            .match_body(Matcher::Json(json!({
                "refresh_token": "old-refresh",
                "grant_type": "refresh_token",
                "client_id": "client-123",
                "client_secret": "secret-456"
            })))
            .with_status(200)
            .with_body(json!({ "access_token": "new-access", "expires_in": 3600 }).to_string())
            .expect(1)
            .create_async()
            .await;
        let note = server
            .mock("POST", "/notes/")
            .match_header("authorization", "Bearer new-access")
            .with_status(200)
            .with_body(json!({ "id": "note-1" }).to_string())
            .create_async()
            .await;

        let store = Arc::new(MemoryStore::default());
        let adapter = GhlAdapter::new(config(&server.url()), store.clone()).unwrap();
        let expired = connection(Some(Utc::now() - Duration::minutes(5)));

        let created = adapter
            .create_note(
                &expired,
                &CrmNote {
                    body: "Meeting: Kickoff".to_string(),
                    contact_id: None,
                },
            )
            .await
            .unwrap();

        refresh.assert_async().await;
        note.assert_async().await;
        assert_eq!(created.id, "note-1");

        let updates = store.updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0, expired.id);
        assert_eq!(updates[0].1.access_token.expose_secret(), "new-access");
        // refresh token kept when the response omits one
        assert_eq!(
            updates[0].1.refresh_token.as_ref().map(|t| t.expose_secret().clone()),
            Some("old-refresh".to_string())
        );
        assert!(updates[0].1.token_expires_at.is_some());
    }

    #[tokio::test]
    async fn refresh_without_refresh_token_fails() {
        let server = Server::new_async().await;
        let adapter =
            GhlAdapter::new(config(&server.url()), Arc::new(MemoryStore::default())).unwrap();
        let mut conn = connection(None);
        conn.refresh_token = None;

        let err = adapter.refresh_token(&conn).await.unwrap_err();

        assert_eq!(err.error_kind, ErrorKind::MissingRefreshToken);
        assert_eq!(err.to_string(), "No refresh token available");
    }

    #[tokio::test]
    async fn non_success_response_carries_vendor_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/tasks/")
            .with_status(422)
            .with_body("{\"message\":\"title is required\"}")
            .expect(1)
            .create_async()
            .await;

        let adapter =
            GhlAdapter::new(config(&server.url()), Arc::new(MemoryStore::default())).unwrap();

        let err = adapter
            .create_task(&connection(valid()), &CrmTask::default())
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            ErrorKind::Upstream {
                status: 422,
                body: "{\"message\":\"title is required\"}".to_string()
            }
        );
    }

    #[tokio::test]
    async fn validate_connection_reflects_vendor_status() {
        let mut server = Server::new_async().await;
        let _ok = server
            .mock("GET", "/contacts/")
            .match_query(Matcher::UrlEncoded("locationId".into(), "loc-1".into()))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let adapter =
            GhlAdapter::new(config(&server.url()), Arc::new(MemoryStore::default())).unwrap();
        let mut conn = connection(valid());
        conn.account_id = Some("loc-1".to_string());

        assert!(adapter.validate_connection(&conn).await.unwrap());

        conn.account_id = Some("loc-2".to_string());
        // no mock matches loc-2, mockito answers 501
        assert!(!adapter.validate_connection(&conn).await.unwrap());
    }
}
