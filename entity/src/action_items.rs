//! SeaORM Entity for action_items extracted from meeting transcripts.

use crate::action_item_status::ActionItemStatus;
use crate::priority::Priority;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::action_items::Model)]
#[sea_orm(schema_name = "meetingmind", table_name = "action_items")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    #[schema(value_type = Uuid)]
    pub organization_id: Id,

    #[schema(value_type = Uuid)]
    pub meeting_id: Id,

    #[schema(value_type = Option<Uuid>)]
    pub transcript_id: Option<Id>,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: Option<String>,

    pub assignee: Option<String>,

    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Option<Date>,

    pub priority: Priority,

    pub status: ActionItemStatus,

    /// Marks work that goes beyond the meeting's original agenda
    pub scope_creep_flag: bool,

    /// Task id in GoHighLevel once synced
    pub ghl_task_id: Option<String>,

    #[schema(value_type = Option<String>, format = DateTime)]
    pub ghl_synced_at: Option<DateTimeWithTimeZone>,

    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Json>,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Pending items that have not been pushed to the CRM yet.
    pub fn awaiting_crm_sync(&self) -> bool {
        self.status == ActionItemStatus::Pending && self.ghl_task_id.is_none()
    }
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

    #[sea_orm(
        belongs_to = "super::transcripts::Entity",
        from = "Column::TranscriptId",
        to = "super::transcripts::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Transcripts,
}

impl Related<super::meetings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Meetings.def()
    }
}

impl Related<super::transcripts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transcripts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
