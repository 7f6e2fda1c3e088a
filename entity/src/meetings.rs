//! SeaORM Entity for the meetings table.

use crate::meeting_status::MeetingStatus;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::meetings::Model)]
#[sea_orm(schema_name = "meetingmind", table_name = "meetings")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    #[schema(value_type = Uuid)]
    pub organization_id: Id,

    pub title: String,

    #[schema(value_type = Option<String>, format = DateTime)]
    pub meeting_date: Option<DateTimeWithTimeZone>,

    /// Location of the uploaded audio in the storage provider
    pub audio_file_url: Option<String>,

    pub audio_file_size: Option<i64>,

    pub status: MeetingStatus,

    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Json>,

    #[schema(value_type = Option<Uuid>)]
    pub created_by: Option<Id>,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organizations::Entity",
        from = "Column::OrganizationId",
        to = "super::organizations::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Organizations,

    #[sea_orm(has_one = "super::transcripts::Entity")]
    Transcripts,

    #[sea_orm(has_many = "super::action_items::Entity")]
    ActionItems,

    #[sea_orm(has_many = "super::playbook_runs::Entity")]
    PlaybookRuns,
}

impl Related<super::organizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizations.def()
    }
}

impl Related<super::transcripts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transcripts.def()
    }
}

impl Related<super::action_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ActionItems.def()
    }
}

impl Related<super::playbook_runs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlaybookRuns.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
