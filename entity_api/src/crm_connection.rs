//! CRUD operations for crm_connections.

use super::error::Error;
use chrono::{DateTime, Utc};
use entity::crm_connections::{ActiveModel, Column, Entity, Model};
use entity::crm_type::CrmType;
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    sea_query::Expr,
    ActiveValue::{Set, Unchanged},
    ConnectionTrait, DatabaseConnection, TryIntoModel,
};

/// Tokens and account details of a freshly authorized vendor account.
#[derive(Clone, Debug)]
pub struct NewConnection {
    pub crm_type: CrmType,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub account_id: Option<String>,
    pub account_name: Option<String>,
    pub metadata: Option<Json>,
}

pub async fn create(
    db: &impl ConnectionTrait,
    organization_id: Id,
    connection: NewConnection,
) -> Result<Model, Error> {
    debug!(
        "Creating {} connection for organization {organization_id}",
        connection.crm_type
    );

    let now = Utc::now();

    let active_model = ActiveModel {
        organization_id: Set(organization_id),
        crm_type: Set(connection.crm_type),
        access_token: Set(connection.access_token),
        refresh_token: Set(connection.refresh_token),
        token_expires_at: Set(connection.token_expires_at.map(|dt| dt.into())),
        account_id: Set(connection.account_id),
        account_name: Set(connection.account_name),
        is_active: Set(true),
        metadata: Set(connection.metadata),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.save(db).await?.try_into_model()?)
}

/// The organization's single active connection for `crm_type`, if any.
pub async fn find_active(
    db: &DatabaseConnection,
    organization_id: Id,
    crm_type: CrmType,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::OrganizationId.eq(organization_id))
        .filter(Column::CrmType.eq(crm_type))
        .filter(Column::IsActive.eq(true))
        .one(db)
        .await?)
}

pub async fn update_tokens(
    db: &DatabaseConnection,
    organization_id: Id,
    id: Id,
    access_token: String,
    refresh_token: Option<String>,
    token_expires_at: Option<DateTime<Utc>>,
) -> Result<Model, Error> {
    let connection = Entity::find_by_id(id)
        .filter(Column::OrganizationId.eq(organization_id))
        .one(db)
        .await?
        .ok_or_else(Error::not_found)?;

    debug!("Updating tokens of CRM connection {id}");

    let active_model = ActiveModel {
        id: Unchanged(connection.id),
        organization_id: Unchanged(connection.organization_id),
        crm_type: Unchanged(connection.crm_type),
        access_token: Set(access_token),
        refresh_token: Set(refresh_token),
        token_expires_at: Set(token_expires_at.map(|dt| dt.into())),
        account_id: Unchanged(connection.account_id),
        account_name: Unchanged(connection.account_name),
        is_active: Unchanged(connection.is_active),
        metadata: Unchanged(connection.metadata),
        created_at: Unchanged(connection.created_at),
        updated_at: Set(Utc::now().into()),
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

/// Soft-disconnects every active connection of the organization for `crm_type`.
/// Returns the number of rows changed.
pub async fn deactivate(
    db: &impl ConnectionTrait,
    organization_id: Id,
    crm_type: CrmType,
) -> Result<u64, Error> {
    let result = Entity::update_many()
        .col_expr(Column::IsActive, Expr::value(false))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::OrganizationId.eq(organization_id))
        .filter(Column::CrmType.eq(crm_type))
        .filter(Column::IsActive.eq(true))
        .exec(db)
        .await?;

    debug!(
        "Deactivated {} {crm_type} connection(s) for organization {organization_id}",
        result.rows_affected
    );

    Ok(result.rows_affected)
}
