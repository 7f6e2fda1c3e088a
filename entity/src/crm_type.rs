use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// External CRM vendors an organization can connect.
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Hash,
    EnumIter,
    Deserialize,
    Serialize,
    DeriveActiveEnum,
    Default,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "crm_type")]
pub enum CrmType {
    /// GoHighLevel
    #[sea_orm(string_value = "ghl")]
    #[default]
    Ghl,
    #[sea_orm(string_value = "hubspot")]
    Hubspot,
    #[sea_orm(string_value = "salesforce")]
    Salesforce,
}

impl std::fmt::Display for CrmType {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ghl => write!(fmt, "ghl"),
            Self::Hubspot => write!(fmt, "hubspot"),
            Self::Salesforce => write!(fmt, "salesforce"),
        }
    }
}
