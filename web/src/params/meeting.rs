use domain::Id;
use serde::Deserialize;
use utoipa::ToSchema;

/// Body of `POST /meetings/transcribe` and `POST /meetings/analyze`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MeetingParams {
    #[schema(value_type = Option<Uuid>)]
    pub(crate) meeting_id: Option<Id>,
}
