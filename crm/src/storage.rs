//! Persistence seam for CRM connections.

use async_trait::async_trait;
use entity::crm_type::CrmType;
use entity::Id;

use crate::connection::{Connection, RefreshedTokens};
use crate::error::Error;

/// Reads and updates stored CRM connections.
///
/// Every lookup is scoped to an organization; implementations must never
/// return another tenant's connection.
#[async_trait]
pub trait ConnectionStore: Send + Sync {
    /// The organization's single active connection for `crm_type`, if any.
    async fn find_active(
        &self,
        organization_id: Id,
        crm_type: CrmType,
    ) -> Result<Option<Connection>, Error>;

    /// Persist tokens obtained by a refresh grant.
    async fn update_tokens(
        &self,
        connection: &Connection,
        tokens: &RefreshedTokens,
    ) -> Result<(), Error>;
}

#[cfg(test)]
pub(crate) mod memory {
    use super::*;
    use std::sync::Mutex;

    /// In-memory store recording every token update.
    #[derive(Default)]
    pub(crate) struct MemoryStore {
        pub connections: Mutex<Vec<Connection>>,
        pub updates: Mutex<Vec<(Id, RefreshedTokens)>>,
    }

    impl MemoryStore {
        pub fn with(connection: Connection) -> Self {
            Self {
                connections: Mutex::new(vec![connection]),
                updates: Mutex::default(),
            }
        }
    }

    #[async_trait]
    impl ConnectionStore for MemoryStore {
        async fn find_active(
            &self,
            organization_id: Id,
            crm_type: CrmType,
        ) -> Result<Option<Connection>, Error> {
            Ok(self
                .connections
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.organization_id == organization_id && c.crm_type == crm_type)
                .cloned())
        }

        async fn update_tokens(
            &self,
            connection: &Connection,
            tokens: &RefreshedTokens,
        ) -> Result<(), Error> {
            self.updates
                .lock()
                .unwrap()
                .push((connection.id, tokens.clone()));
            Ok(())
        }
    }
}
