use crate::extractors::{
    authenticated_user::AuthenticatedUser, json_body::JsonBody, request_meta::ClientMeta,
};
use crate::params::playbook::{StatusParams, TriggerParams};
use crate::{AppState, Error};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::playbook as PlaybookApi;
use log::*;
use serde_json::json;

/// POST start a playbook run for a meeting
#[utoipa::path(
    post,
    path = "/playbooks/trigger",
    request_body = TriggerParams,
    responses(
        (status = 200, description = "`{success, playbookRunId, executionId}`"),
        (status = 400, description = "Meeting ID and playbook type required, or unknown playbook type"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Meeting not found"),
        (status = 500, description = "Playbook trigger failed"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn trigger(
    AuthenticatedUser {
        profile,
        organization,
    }: AuthenticatedUser,
    ClientMeta(meta): ClientMeta,
    State(app_state): State<AppState>,
    JsonBody(params): JsonBody<TriggerParams>,
) -> Result<impl IntoResponse, Error> {
    debug!(
        "POST Trigger playbook {:?} for meeting {:?}",
        params.playbook_type, params.meeting_id
    );

    let outcome = PlaybookApi::trigger(
        app_state.db_conn_ref(),
        &app_state.config,
        &app_state.crm_manager,
        organization.id,
        profile.id,
        params.meeting_id,
        params.playbook_type.as_deref(),
        &meta,
    )
    .await?;

    debug!("Playbook run {} CRM sync: {:?}", outcome.run.id, outcome.crm_sync);

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "playbookRunId": outcome.run.id,
            "executionId": outcome.execution_id,
        })),
    ))
}

/// POST status callback from the workflow engine
#[utoipa::path(
    post,
    path = "/playbooks/status",
    request_body = StatusParams,
    responses(
        (status = 200, description = "`{success}`"),
        (status = 400, description = "Playbook run ID and status required, or unknown status"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Playbook run not found"),
        (status = 409, description = "The run already finished"),
        (status = 500, description = "Failed to update playbook run"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_status(
    AuthenticatedUser {
        profile,
        organization,
    }: AuthenticatedUser,
    ClientMeta(meta): ClientMeta,
    State(app_state): State<AppState>,
    JsonBody(params): JsonBody<StatusParams>,
) -> Result<impl IntoResponse, Error> {
    debug!(
        "POST Playbook run {:?} status {:?}",
        params.playbook_run_id, params.status
    );

    PlaybookApi::update_status(
        app_state.db_conn_ref(),
        organization.id,
        profile.id,
        params.playbook_run_id,
        params.status.as_deref(),
        params.result,
        params.error_message,
        &meta,
    )
    .await?;

    Ok((StatusCode::OK, Json(json!({ "success": true }))))
}
