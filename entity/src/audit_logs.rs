//! SeaORM Entity for audit_logs. Rows are only ever inserted.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::audit_logs::Model)]
#[sea_orm(schema_name = "meetingmind", table_name = "audit_logs")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    #[schema(value_type = Uuid)]
    pub organization_id: Id,

    #[schema(value_type = Option<Uuid>)]
    pub user_id: Option<Id>,

    /// Dotted action name, e.g. `meeting.analyzed`
    pub action_type: String,

    pub resource_type: Option<String>,

    #[schema(value_type = Option<Uuid>)]
    pub resource_id: Option<Id>,

    #[schema(value_type = Option<Object>)]
    pub details: Option<Json>,

    pub ip_address: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub user_agent: Option<String>,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,
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
}

impl Related<super::organizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
