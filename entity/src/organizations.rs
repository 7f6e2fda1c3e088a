//! SeaORM Entity for the organizations table. An organization is the tenant
//! boundary: every other row references one.

use crate::subscription_status::SubscriptionStatus;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::organizations::Model)]
#[sea_orm(schema_name = "meetingmind", table_name = "organizations")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    pub name: String,

    #[sea_orm(unique)]
    pub slug: String,

    /// Customer id at the payment provider, set on first checkout
    #[serde(skip_deserializing)]
    pub stripe_customer_id: Option<String>,

    #[serde(skip_deserializing)]
    pub stripe_subscription_id: Option<String>,

    pub subscription_status: SubscriptionStatus,

    /// Founding members keep access without a paid subscription
    pub is_founding_member: bool,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_profiles::Entity")]
    UserProfiles,

    #[sea_orm(has_many = "super::meetings::Entity")]
    Meetings,

    #[sea_orm(has_many = "super::crm_connections::Entity")]
    CrmConnections,
}

impl Related<super::user_profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserProfiles.def()
    }
}

impl Related<super::meetings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Meetings.def()
    }
}

impl Related<super::crm_connections::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CrmConnections.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
