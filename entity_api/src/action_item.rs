//! CRUD operations for action_items.

use super::error::Error;
use chrono::{NaiveDate, Utc};
use entity::action_item_status::ActionItemStatus;
use entity::action_items::{ActiveModel, Column, Entity, Model};
use entity::priority::Priority;
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, QueryOrder, QuerySelect, TryIntoModel,
};

/// Values for a new action item. Status starts as `pending`.
#[derive(Clone, Debug, Default)]
pub struct NewActionItem {
    pub title: String,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    pub scope_creep_flag: bool,
}

pub async fn create(
    db: &DatabaseConnection,
    organization_id: Id,
    meeting_id: Id,
    transcript_id: Option<Id>,
    item: NewActionItem,
) -> Result<Model, Error> {
    debug!("Creating action item \"{}\" for meeting {meeting_id}", item.title);

    let now = Utc::now();

    let active_model = ActiveModel {
        organization_id: Set(organization_id),
        meeting_id: Set(meeting_id),
        transcript_id: Set(transcript_id),
        title: Set(item.title),
        description: Set(item.description),
        assignee: Set(item.assignee),
        due_date: Set(item.due_date),
        priority: Set(item.priority),
        status: Set(ActionItemStatus::Pending),
        scope_creep_flag: Set(item.scope_creep_flag),
        ghl_task_id: Set(None),
        ghl_synced_at: Set(None),
        metadata: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.save(db).await?.try_into_model()?)
}

pub async fn find_by_meeting_id(
    db: &DatabaseConnection,
    organization_id: Id,
    meeting_id: Id,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::MeetingId.eq(meeting_id))
        .filter(Column::OrganizationId.eq(organization_id))
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await?)
}

/// Pending and in-progress items across the organization, newest first.
pub async fn find_open(
    db: &DatabaseConnection,
    organization_id: Id,
    limit: u64,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::OrganizationId.eq(organization_id))
        .filter(Column::Status.is_in([ActionItemStatus::Pending, ActionItemStatus::InProgress]))
        .order_by_desc(Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await?)
}

/// Stamps an item with the CRM task created for it.
pub async fn mark_synced(
    db: &DatabaseConnection,
    organization_id: Id,
    id: Id,
    ghl_task_id: &str,
) -> Result<Model, Error> {
    let item = Entity::find_by_id(id)
        .filter(Column::OrganizationId.eq(organization_id))
        .one(db)
        .await?
        .ok_or_else(Error::not_found)?;

    debug!("Marking action item {id} synced as CRM task {ghl_task_id}");

    let now = Utc::now();

    let active_model = ActiveModel {
        id: Unchanged(item.id),
        organization_id: Unchanged(item.organization_id),
        meeting_id: Unchanged(item.meeting_id),
        transcript_id: Unchanged(item.transcript_id),
        title: Unchanged(item.title),
        description: Unchanged(item.description),
        assignee: Unchanged(item.assignee),
        due_date: Unchanged(item.due_date),
        priority: Unchanged(item.priority),
        status: Unchanged(item.status),
        scope_creep_flag: Unchanged(item.scope_creep_flag),
        ghl_task_id: Set(Some(ghl_task_id.to_string())),
        ghl_synced_at: Set(Some(now.into())),
        metadata: Unchanged(item.metadata),
        created_at: Unchanged(item.created_at),
        updated_at: Set(now.into()),
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}
