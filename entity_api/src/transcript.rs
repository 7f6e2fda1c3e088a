use super::error::Error;
use chrono::Utc;
use entity::transcripts::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, ActiveValue::Set, DatabaseConnection, TryIntoModel};

/// Stores the transcript of a meeting. `meeting_id` is unique, so a second
/// transcript for the same meeting is rejected by the database.
pub async fn create(
    db: &DatabaseConnection,
    organization_id: Id,
    meeting_id: Id,
    raw_text: String,
    structured_data: Option<Json>,
    voxtral_metadata: Option<Json>,
) -> Result<Model, Error> {
    debug!(
        "Storing transcript for meeting {meeting_id} ({} chars)",
        raw_text.chars().count()
    );

    let active_model = ActiveModel {
        meeting_id: Set(meeting_id),
        organization_id: Set(organization_id),
        raw_text: Set(raw_text),
        structured_data: Set(structured_data),
        voxtral_metadata: Set(voxtral_metadata),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.save(db).await?.try_into_model()?)
}

pub async fn find_by_meeting_id(
    db: &DatabaseConnection,
    organization_id: Id,
    meeting_id: Id,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::MeetingId.eq(meeting_id))
        .filter(Column::OrganizationId.eq(organization_id))
        .one(db)
        .await?)
}
