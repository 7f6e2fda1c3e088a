use super::error::Error;
use chrono::Utc;
use entity::audit_logs::{ActiveModel, Model};
use entity::Id;
use sea_orm::{entity::prelude::*, ActiveValue::Set, DatabaseConnection};

/// Values of one audit entry.
#[derive(Clone, Debug, Default)]
pub struct NewAuditLog {
    pub organization_id: Id,
    pub user_id: Option<Id>,
    pub action_type: String,
    pub resource_type: Option<String>,
    pub resource_id: Option<Id>,
    pub details: Option<Json>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Appends an entry. Audit entries are never updated or deleted.
pub async fn create(db: &DatabaseConnection, entry: NewAuditLog) -> Result<Model, Error> {
    let active_model = ActiveModel {
        organization_id: Set(entry.organization_id),
        user_id: Set(entry.user_id),
        action_type: Set(entry.action_type),
        resource_type: Set(entry.resource_type),
        resource_id: Set(entry.resource_id),
        details: Set(entry.details),
        ip_address: Set(entry.ip_address),
        user_agent: Set(entry.user_agent),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.insert(db).await?)
}
