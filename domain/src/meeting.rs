//! Meeting lifecycle: detail reads, transcription and analysis.

use crate::audit::{self, AuditAction, AuditEvent, RequestMeta};
use crate::error::Error;
use crate::gateway::transcription::{TranscriptionClient, TranscriptionOutput, TranscriptionRequest};
use crate::meeting_mind::MeetingMindAgent;
use crate::meeting_status::MeetingStatus;
use crate::{action_items, meetings, transcripts, Id};
use entity_api::{action_item, meeting, transcript};
use log::*;
use meeting_ai::traits::agent::Agent;
use meeting_ai::AgentContext;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use service::config::Config;

/// Allowed meeting status changes. `failed` is reachable from every other
/// state and is terminal; re-analysis keeps a meeting `analyzed`.
pub fn can_transition(from: MeetingStatus, to: MeetingStatus) -> bool {
    use MeetingStatus::*;

    match (from, to) {
        (Failed, _) => false,
        (_, Failed) => true,
        (Pending, Processing)
        | (Processing, Transcribed)
        | (Transcribed, Analyzed)
        | (Analyzed, Analyzed) => true,
        _ => false,
    }
}

/// Fails with `InvalidTransition` when `meeting` may not move to `to`.
pub fn ensure_transition(meeting: &meetings::Model, to: MeetingStatus) -> Result<(), Error> {
    if can_transition(meeting.status, to) {
        return Ok(());
    }

    warn!(
        "Rejected meeting {} transition {} -> {to}",
        meeting.id, meeting.status
    );
    Err(Error::invalid_transition(format!(
        "Cannot move meeting from {} to {to}",
        meeting.status
    )))
}

/// Moves `meeting` to `to`, rejecting changes the lifecycle does not allow.
pub async fn transition(
    db: &DatabaseConnection,
    meeting: meetings::Model,
    to: MeetingStatus,
) -> Result<meetings::Model, Error> {
    ensure_transition(&meeting, to)?;

    Ok(meeting::update_status(db, meeting, to).await?)
}

/// Loads a meeting of the organization; foreign and missing ids look the same.
pub async fn find_by_id(
    db: &DatabaseConnection,
    organization_id: Id,
    meeting_id: Id,
) -> Result<meetings::Model, Error> {
    meeting::find_by_id(db, organization_id, meeting_id)
        .await
        .map_err(|err| {
            let err = Error::from(err);
            if err.is_not_found() {
                Error::not_found("Meeting not found")
            } else {
                err
            }
        })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingDetail {
    pub meeting: meetings::Model,
    pub transcript: Option<transcripts::Model>,
    pub action_items: Vec<action_items::Model>,
}

pub async fn detail(
    db: &DatabaseConnection,
    organization_id: Id,
    meeting_id: Id,
) -> Result<MeetingDetail, Error> {
    let meeting = find_by_id(db, organization_id, meeting_id).await?;

    let (transcript, action_items) = tokio::try_join!(
        transcript::find_by_meeting_id(db, organization_id, meeting.id),
        action_item::find_by_meeting_id(db, organization_id, meeting.id),
    )?;

    Ok(MeetingDetail {
        meeting,
        transcript,
        action_items,
    })
}

/// Hands the meeting's audio to the transcription function.
///
/// When the function answers with the transcript text it is stored here and
/// the meeting becomes `transcribed`; otherwise the function persists it later
/// and the meeting stays `processing`.
pub async fn transcribe(
    db: &DatabaseConnection,
    config: &Config,
    organization_id: Id,
    user_id: Id,
    meeting_id: Option<Id>,
    meta: &RequestMeta,
) -> Result<Value, Error> {
    let meeting_id = meeting_id.ok_or_else(|| Error::validation("Meeting ID required"))?;
    let meeting = find_by_id(db, organization_id, meeting_id).await?;

    let audio_url = meeting
        .audio_file_url
        .clone()
        .ok_or_else(|| Error::validation("No audio file found"))?;

    let function_url = config
        .transcription_function_url()
        .ok_or_else(|| Error::config("Transcription function not configured"))?;
    let client = TranscriptionClient::new(
        &function_url,
        config.transcription_function_key().as_deref(),
    )?;

    let meeting = transition(db, meeting, MeetingStatus::Processing).await?;

    let request = TranscriptionRequest {
        meeting_id: meeting.id,
        audio_url: &audio_url,
        organization_id,
    };
    let response = match client.transcribe(&request).await {
        Ok(response) => response,
        Err(err) => {
            error!("Transcription of meeting {} failed: {err}", meeting.id);
            if let Err(status_err) = transition(db, meeting, MeetingStatus::Failed).await {
                warn!("Could not mark meeting {meeting_id} failed: {status_err}");
            }
            return Err(err.with_context("Transcription failed"));
        }
    };

    let output = TranscriptionOutput::from_response(&response);
    if let Some(text) = output.text {
        let stored = transcript::create(
            db,
            organization_id,
            meeting.id,
            text,
            output.segments,
            output.metadata,
        )
        .await?;
        info!("Stored transcript {} for meeting {}", stored.id, meeting.id);
        transition(db, meeting, MeetingStatus::Transcribed).await?;
    }

    audit::log_event(
        db,
        AuditEvent::new(organization_id, Some(user_id), AuditAction::MeetingTranscribed)
            .resource("meeting", meeting_id)
            .meta(meta),
    )
    .await;

    Ok(response)
}

/// Runs action-item extraction on a transcribed meeting.
pub async fn analyze(
    db: &DatabaseConnection,
    config: &Config,
    organization_id: Id,
    user_id: Id,
    meeting_id: Option<Id>,
    meta: &RequestMeta,
) -> Result<Value, Error> {
    let meeting_id = meeting_id.ok_or_else(|| Error::validation("Meeting ID required"))?;
    let meeting = find_by_id(db, organization_id, meeting_id).await?;

    if meeting.status != MeetingStatus::Transcribed {
        return Err(Error::validation(
            "Meeting must be transcribed before analysis",
        ));
    }

    let agent = MeetingMindAgent::from_config(db, config);
    let context = AgentContext::new(organization_id, user_id)
        .with_metadata("meetingId", json!(meeting.id));

    let result = agent.execute(context).await;
    if !result.success {
        let message = result
            .error
            .unwrap_or_else(|| "Analysis failed".to_string());
        error!("Analysis of meeting {meeting_id} failed: {message}");
        return Err(Error::other(message));
    }

    let data = result.data.unwrap_or(Value::Null);
    let item_count = data["actionItems"].as_array().map_or(0, Vec::len);

    audit::log_event(
        db,
        AuditEvent::new(organization_id, Some(user_id), AuditAction::MeetingAnalyzed)
            .resource("meeting", meeting_id)
            .details(json!({ "actionItemCount": item_count }))
            .meta(meta),
    )
    .await;

    Ok(data)
}
