//! Tenant-scoped queries over meetings. Every lookup filters on
//! `organization_id`, so a foreign id reads exactly like a missing one.

use super::error::Error;
use chrono::Utc;
use entity::meeting_status::MeetingStatus;
use entity::meetings::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, QueryOrder, QuerySelect, TryIntoModel,
};

pub async fn create(
    db: &DatabaseConnection,
    organization_id: Id,
    created_by: Option<Id>,
    title: &str,
    audio_file_url: Option<String>,
    audio_file_size: Option<i64>,
) -> Result<Model, Error> {
    debug!("Creating meeting \"{title}\" for organization {organization_id}");

    let now = Utc::now();

    let active_model = ActiveModel {
        organization_id: Set(organization_id),
        title: Set(title.to_string()),
        meeting_date: Set(Some(now.into())),
        audio_file_url: Set(audio_file_url),
        audio_file_size: Set(audio_file_size),
        status: Set(MeetingStatus::Pending),
        created_by: Set(created_by),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.save(db).await?.try_into_model()?)
}

pub async fn find_by_id(
    db: &DatabaseConnection,
    organization_id: Id,
    id: Id,
) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .filter(Column::OrganizationId.eq(organization_id))
        .one(db)
        .await?
        .ok_or_else(Error::not_found)
}

/// Most recent meetings first.
pub async fn find_recent(
    db: &DatabaseConnection,
    organization_id: Id,
    limit: u64,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::OrganizationId.eq(organization_id))
        .order_by_desc(Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await?)
}

/// Persists `status` on an already loaded (and therefore tenant-checked) meeting.
pub async fn update_status(
    db: &DatabaseConnection,
    meeting: Model,
    status: MeetingStatus,
) -> Result<Model, Error> {
    debug!(
        "Updating meeting {} status: {} -> {status}",
        meeting.id, meeting.status
    );

    let active_model = ActiveModel {
        id: Unchanged(meeting.id),
        organization_id: Unchanged(meeting.organization_id),
        title: Unchanged(meeting.title),
        meeting_date: Unchanged(meeting.meeting_date),
        audio_file_url: Unchanged(meeting.audio_file_url),
        audio_file_size: Unchanged(meeting.audio_file_size),
        status: Set(status),
        metadata: Unchanged(meeting.metadata),
        created_by: Unchanged(meeting.created_by),
        created_at: Unchanged(meeting.created_at),
        updated_at: Set(Utc::now().into()),
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use crate::error::EntityApiErrorKind;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn test_model(organization_id: Id) -> Model {
        let now = Utc::now();
        Model {
            id: Id::new_v4(),
            organization_id,
            title: "Weekly sync".to_string(),
            meeting_date: Some(now.into()),
            audio_file_url: Some("https://storage.example.com/a.mp3".to_string()),
            audio_file_size: Some(1024),
            status: MeetingStatus::Pending,
            metadata: None,
            created_by: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn find_by_id_filters_on_organization() -> Result<(), Error> {
        let organization_id = Id::new_v4();
        let meeting = test_model(organization_id);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![meeting.clone()]])
            .into_connection();

        find_by_id(&db, organization_id, meeting.id).await?;

        let log = db.into_transaction_log();
        let sql = &log[0].statements()[0].sql;
        assert!(sql.contains(r#""meetings"."id" = $1"#));
        assert!(sql.contains(r#""meetings"."organization_id" = $2"#));

        Ok(())
    }

    #[tokio::test]
    async fn find_by_id_in_another_organization_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<Model, Vec<Model>, _>(vec![vec![]])
            .into_connection();

        let result = find_by_id(&db, Id::new_v4(), Id::new_v4()).await;

        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotFound
        );
    }

    #[tokio::test]
    async fn update_status_returns_the_updated_meeting() -> Result<(), Error> {
        let organization_id = Id::new_v4();
        let meeting = test_model(organization_id);
        let mut updated = meeting.clone();
        updated.status = MeetingStatus::Processing;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![updated.clone()]])
            .into_connection();

        let result = update_status(&db, meeting, MeetingStatus::Processing).await?;

        assert_eq!(result.status, MeetingStatus::Processing);
        Ok(())
    }
}
