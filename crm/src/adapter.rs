//! CRM adapter capability trait.

use async_trait::async_trait;
use entity::crm_type::CrmType;

use crate::connection::{Connection, CreatedRecord, CrmNote, CrmTask};
use crate::error::Error;

/// The contract every CRM vendor implements.
///
/// Callers select an adapter by `crm_type` and never branch on the vendor
/// otherwise. Implementations refresh an expired access token before any
/// authenticated call and persist the new tokens before proceeding. No call
/// is retried.
#[async_trait]
pub trait Adapter: Send + Sync {
    fn crm_type(&self) -> CrmType;

    async fn create_task(&self, connection: &Connection, task: &CrmTask)
        -> Result<CreatedRecord, Error>;

    async fn create_note(&self, connection: &Connection, note: &CrmNote)
        -> Result<CreatedRecord, Error>;

    /// Perform the vendor's refresh grant and persist the result.
    ///
    /// Returns the connection carrying the new tokens.
    async fn refresh_token(&self, connection: &Connection) -> Result<Connection, Error>;

    /// Whether the vendor currently accepts the connection's credentials.
    async fn validate_connection(&self, connection: &Connection) -> Result<bool, Error>;
}
