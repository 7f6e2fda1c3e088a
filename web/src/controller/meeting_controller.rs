use crate::extractors::{
    authenticated_user::AuthenticatedUser, json_body::JsonBody, request_meta::ClientMeta,
};
use crate::params::meeting::MeetingParams;
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{meeting as MeetingApi, Id};
use log::*;
use serde_json::json;

/// POST send a meeting's audio to the transcription function
#[utoipa::path(
    post,
    path = "/meetings/transcribe",
    request_body = MeetingParams,
    responses(
        (status = 200, description = "`{success, data}` with the transcription function's response"),
        (status = 400, description = "Meeting ID required, or the meeting has no audio file"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Meeting not found"),
        (status = 409, description = "The meeting cannot be transcribed from its current status"),
        (status = 500, description = "Transcription failed"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn transcribe(
    AuthenticatedUser {
        profile,
        organization,
    }: AuthenticatedUser,
    ClientMeta(meta): ClientMeta,
    State(app_state): State<AppState>,
    JsonBody(params): JsonBody<MeetingParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Transcribe meeting {:?}", params.meeting_id);

    let data = MeetingApi::transcribe(
        app_state.db_conn_ref(),
        &app_state.config,
        organization.id,
        profile.id,
        params.meeting_id,
        &meta,
    )
    .await?;

    Ok((StatusCode::OK, Json(json!({ "success": true, "data": data }))))
}

/// POST extract action items from a transcribed meeting
#[utoipa::path(
    post,
    path = "/meetings/analyze",
    request_body = MeetingParams,
    responses(
        (status = 200, description = "`{success, data: {actionItems, extractedAt}}`"),
        (status = 400, description = "Meeting ID required, or the meeting is not transcribed yet"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Meeting not found"),
        (status = 500, description = "The extraction agent failed"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn analyze(
    AuthenticatedUser {
        profile,
        organization,
    }: AuthenticatedUser,
    ClientMeta(meta): ClientMeta,
    State(app_state): State<AppState>,
    JsonBody(params): JsonBody<MeetingParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Analyze meeting {:?}", params.meeting_id);

    let data = MeetingApi::analyze(
        app_state.db_conn_ref(),
        &app_state.config,
        organization.id,
        profile.id,
        params.meeting_id,
        &meta,
    )
    .await?;

    Ok((StatusCode::OK, Json(json!({ "success": true, "data": data }))))
}

/// GET a meeting with its transcript and action items
#[utoipa::path(
    get,
    path = "/meetings/{id}",
    params(
        ("id" = Uuid, Path, description = "Meeting id")
    ),
    responses(
        (status = 200, description = "`{meeting, transcript, actionItems}`"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Meeting not found"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn read(
    AuthenticatedUser { organization, .. }: AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Meeting by id: {id}");

    let detail = MeetingApi::detail(app_state.db_conn_ref(), organization.id, id).await?;

    Ok((StatusCode::OK, Json(detail)))
}
