use domain::Id;
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

/// Body of `POST /playbooks/trigger`.
///
/// Both fields are optional here so that their absence is reported with the
/// service's own 400 message.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TriggerParams {
    #[schema(value_type = Option<Uuid>)]
    pub(crate) meeting_id: Option<Id>,
    /// One of `ghl_sync`, `follow_up_email`, `task_creation`, `custom`.
    pub(crate) playbook_type: Option<String>,
}

/// Body the workflow engine posts back to `POST /playbooks/status`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatusParams {
    #[schema(value_type = Option<Uuid>)]
    pub(crate) playbook_run_id: Option<Id>,
    pub(crate) status: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub(crate) result: Option<Value>,
    #[serde(rename = "error")]
    pub(crate) error_message: Option<String>,
}
