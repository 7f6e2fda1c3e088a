//! SeaORM Entity for playbook_runs, one row per workflow invocation.

use crate::playbook_run_status::PlaybookRunStatus;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::playbook_runs::Model)]
#[sea_orm(schema_name = "meetingmind", table_name = "playbook_runs")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    #[schema(value_type = Uuid)]
    pub organization_id: Id,

    #[schema(value_type = Uuid)]
    pub meeting_id: Id,

    /// e.g. `ghl_sync`, `follow_up_email`
    pub playbook_type: String,

    pub status: PlaybookRunStatus,

    /// Execution id reported back by the workflow engine
    pub n8n_execution_id: Option<String>,

    /// Meeting, action items and transcript as sent to the webhook
    #[schema(value_type = Option<Object>)]
    pub payload: Option<Json>,

    #[schema(value_type = Option<Object>)]
    pub result: Option<Json>,

    pub error_message: Option<String>,

    #[schema(value_type = Option<String>, format = DateTime)]
    pub started_at: Option<DateTimeWithTimeZone>,

    #[schema(value_type = Option<String>, format = DateTime)]
    pub completed_at: Option<DateTimeWithTimeZone>,

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
}

impl Related<super::meetings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Meetings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
