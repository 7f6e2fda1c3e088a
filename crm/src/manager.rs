//! Registry of CRM adapters keyed by vendor.

use std::collections::HashMap;
use std::sync::Arc;

use entity::crm_type::CrmType;
use entity::Id;
use log::*;

use crate::adapter::Adapter;
use crate::adapters::ghl::{GhlAdapter, GhlConfig};
use crate::connection::{Connection, CreatedRecord, CrmNote, CrmTask};
use crate::error::{Error, ErrorKind};
use crate::storage::ConnectionStore;

/// Vendors with an adapter. Extend this list to add one.
pub const SUPPORTED_VENDORS: [CrmType; 1] = [CrmType::Ghl];

/// Dispatches CRM calls for an organization to the adapter of the requested vendor.
///
/// The adapter map is fixed at construction.
pub struct CrmManager {
    adapters: HashMap<CrmType, Arc<dyn Adapter>>,
    store: Arc<dyn ConnectionStore>,
}

impl CrmManager {
    pub fn new(store: Arc<dyn ConnectionStore>, adapters: Vec<Arc<dyn Adapter>>) -> Self {
        let adapters = adapters
            .into_iter()
            .map(|adapter| (adapter.crm_type(), adapter))
            .collect();

        Self { adapters, store }
    }

    /// Builds one adapter for every entry of `SUPPORTED_VENDORS`.
    pub fn from_config(ghl: GhlConfig, store: Arc<dyn ConnectionStore>) -> Result<Self, Error> {
        let mut adapters: Vec<Arc<dyn Adapter>> = Vec::with_capacity(SUPPORTED_VENDORS.len());

        for crm_type in SUPPORTED_VENDORS {
            match crm_type {
                CrmType::Ghl => {
                    adapters.push(Arc::new(GhlAdapter::new(ghl.clone(), store.clone())?))
                }
                other => return Err(Error::new(ErrorKind::NoAdapter(other))),
            }
        }

        Ok(Self::new(store, adapters))
    }

    pub fn supports(&self, crm_type: CrmType) -> bool {
        self.adapters.contains_key(&crm_type)
    }

    fn adapter(&self, crm_type: CrmType) -> Result<&Arc<dyn Adapter>, Error> {
        self.adapters
            .get(&crm_type)
            .ok_or_else(|| Error::new(ErrorKind::NoAdapter(crm_type)))
    }

    /// The organization's active connection, or `NoActiveConnection`.
    pub async fn active_connection(
        &self,
        organization_id: Id,
        crm_type: CrmType,
    ) -> Result<Connection, Error> {
        self.store
            .find_active(organization_id, crm_type)
            .await?
            .ok_or_else(|| Error::new(ErrorKind::NoActiveConnection(crm_type)))
    }

    pub async fn create_task(
        &self,
        organization_id: Id,
        crm_type: CrmType,
        task: &CrmTask,
    ) -> Result<CreatedRecord, Error> {
        let connection = self.active_connection(organization_id, crm_type).await?;
        let adapter = self.adapter(crm_type)?;

        debug!("Creating {crm_type} task for organization {organization_id}");
        adapter.create_task(&connection, task).await
    }

    pub async fn create_note(
        &self,
        organization_id: Id,
        crm_type: CrmType,
        note: &CrmNote,
    ) -> Result<CreatedRecord, Error> {
        let connection = self.active_connection(organization_id, crm_type).await?;
        let adapter = self.adapter(crm_type)?;

        debug!("Creating {crm_type} note for organization {organization_id}");
        adapter.create_note(&connection, note).await
    }

    /// Validates an already loaded connection with its vendor's adapter.
    pub async fn validate_connection(&self, connection: &Connection) -> Result<bool, Error> {
        self.adapter(connection.crm_type)?
            .validate_connection(connection)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;
    use chrono::{Duration, Utc};
    use mockito::Server;
    use secrecy::SecretString;
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

    fn connection(organization_id: Id) -> Connection {
        Connection {
            id: Id::new_v4(),
            organization_id,
            crm_type: CrmType::Ghl,
            access_token: SecretString::from("access".to_string()),
            refresh_token: Some(SecretString::from("refresh".to_string())),
            token_expires_at: Some(Utc::now() + Duration::hours(1)),
            account_id: None,
            account_name: None,
        }
    }

    #[tokio::test]
    async fn create_task_without_active_connection_makes_no_http_call() {
        let mut server = Server::new_async().await;
        let tasks = server
            .mock("POST", "/tasks/")
            .expect(0)
            .create_async()
            .await;
        let tokens = server
            .mock("POST", "/oauth/token")
            .expect(0)
            .create_async()
            .await;

        let manager =
            CrmManager::from_config(config(&server.url()), Arc::new(MemoryStore::default()))
                .unwrap();

        let err = manager
            .create_task(Id::new_v4(), CrmType::Ghl, &CrmTask::default())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("No active ghl connection found"));
        tasks.assert_async().await;
        tokens.assert_async().await;
    }

    #[tokio::test]
    async fn create_task_never_uses_another_tenants_connection() {
        let mut server = Server::new_async().await;
        let tasks = server
            .mock("POST", "/tasks/")
            .expect(0)
            .create_async()
            .await;

        let store = Arc::new(MemoryStore::with(connection(Id::new_v4())));
        let manager = CrmManager::from_config(config(&server.url()), store).unwrap();

        let err = manager
            .create_task(Id::new_v4(), CrmType::Ghl, &CrmTask::default())
            .await
            .unwrap_err();

        assert_eq!(err.error_kind, ErrorKind::NoActiveConnection(CrmType::Ghl));
        tasks.assert_async().await;
    }

    #[tokio::test]
    async fn create_task_dispatches_to_the_vendor_adapter() {
        let mut server = Server::new_async().await;
        let tasks = server
            .mock("POST", "/tasks/")
            .match_header("authorization", "Bearer access")
            .with_status(200)
            .with_body(json!({ "task": { "id": "t-9" } }).to_string())
            .expect(1)
            .create_async()
            .await;

        let organization_id = Id::new_v4();
        let store = Arc::new(MemoryStore::with(connection(organization_id)));
        let manager = CrmManager::from_config(config(&server.url()), store).unwrap();

        let created = manager
            .create_task(
                organization_id,
                CrmType::Ghl,
                &CrmTask {
                    title: "Follow up".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        tasks.assert_async().await;
        assert_eq!(created.id, "t-9");
    }

    #[tokio::test]
    async fn unsupported_vendor_with_connection_has_no_adapter() {
        let organization_id = Id::new_v4();
        let mut hubspot = connection(organization_id);
        hubspot.crm_type = CrmType::Hubspot;
        let store = Arc::new(MemoryStore::with(hubspot));
        let manager = CrmManager::from_config(config("http://localhost:1"), store).unwrap();

        let err = manager
            .create_note(organization_id, CrmType::Hubspot, &CrmNote::default())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "No adapter found for hubspot");
        assert!(manager.supports(CrmType::Ghl));
        assert!(!manager.supports(CrmType::Salesforce));
    }
}
