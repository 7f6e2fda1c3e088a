//! SeaORM Entity for transcripts. One per meeting, written once.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::transcripts::Model)]
#[sea_orm(schema_name = "meetingmind", table_name = "transcripts")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    #[sea_orm(unique)]
    #[schema(value_type = Uuid)]
    pub meeting_id: Id,

    #[schema(value_type = Uuid)]
    pub organization_id: Id,

    #[sea_orm(column_type = "Text")]
    pub raw_text: String,

    /// Speaker segments and other structure returned by the transcription function
    #[schema(value_type = Option<Object>)]
    pub structured_data: Option<Json>,

    #[schema(value_type = Option<Object>)]
    pub voxtral_metadata: Option<Json>,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::meetings::Entity",
        from = "Column::MeetingId",
        to = "super::meetings::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Meetings,

    #[sea_orm(has_many = "super::action_items::Entity")]
    ActionItems,
}

impl Related<super::meetings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Meetings.def()
    }
}

impl Related<super::action_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ActionItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
