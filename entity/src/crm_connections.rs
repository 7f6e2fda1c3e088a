//! SeaORM Entity for crm_connections.
//! At most one active row per (organization_id, crm_type); disconnecting
//! clears `is_active` instead of deleting.

use crate::crm_type::CrmType;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::crm_connections::Model)]
#[sea_orm(schema_name = "meetingmind", table_name = "crm_connections")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    #[schema(value_type = Uuid)]
    pub organization_id: Id,

    pub crm_type: CrmType,

    #[serde(skip_serializing)]
    #[sea_orm(column_type = "Text")]
    pub access_token: String,

    #[serde(skip_serializing)]
    #[sea_orm(column_type = "Text")]
    pub refresh_token: Option<String>,

    #[schema(value_type = Option<String>, format = DateTime)]
    pub token_expires_at: Option<DateTimeWithTimeZone>,

    /// Vendor account the tokens belong to (GoHighLevel location id)
    pub account_id: Option<String>,

    pub account_name: Option<String>,

    pub is_active: bool,

    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Json>,

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
}

impl Related<super::organizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
