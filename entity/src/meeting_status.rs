use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Processing state of an uploaded meeting.
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    EnumIter,
    Deserialize,
    Serialize,
    DeriveActiveEnum,
    Default,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "meeting_status")]
pub enum MeetingStatus {
    /// Audio uploaded, nothing requested yet
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    /// Handed to the transcription function
    #[sea_orm(string_value = "processing")]
    Processing,
    /// A transcript exists
    #[sea_orm(string_value = "transcribed")]
    Transcribed,
    /// Action items have been extracted
    #[sea_orm(string_value = "analyzed")]
    Analyzed,
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl std::fmt::Display for MeetingStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(fmt, "pending"),
            Self::Processing => write!(fmt, "processing"),
            Self::Transcribed => write!(fmt, "transcribed"),
            Self::Analyzed => write!(fmt, "analyzed"),
            Self::Failed => write!(fmt, "failed"),
        }
    }
}
