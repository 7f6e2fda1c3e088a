use super::error::Error;
use chrono::Utc;
use entity::user_profiles::{ActiveModel, Entity, Model};
use entity::user_role::UserRole;
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, ActiveValue::Set, DatabaseConnection};

/// Creates the profile for a user that already exists at the auth provider.
pub async fn create(
    db: &DatabaseConnection,
    id: Id,
    email: &str,
    full_name: Option<String>,
    organization_id: Option<Id>,
    role: UserRole,
) -> Result<Model, Error> {
    debug!("Creating user profile {id} ({email})");

    let now = Utc::now();

    let active_model = ActiveModel {
        id: Set(id),
        email: Set(email.to_string()),
        full_name: Set(full_name),
        organization_id: Set(organization_id),
        role: Set(role),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    Ok(active_model.insert(db).await?)
}

pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(Error::not_found)
}
