//! Playbooks: automation workflows run by the external workflow engine and
//! tracked locally as playbook runs.

use crate::audit::{self, AuditAction, AuditEvent, RequestMeta};
use crate::crm_type::CrmType;
use crate::error::Error;
use crate::gateway::workflow::{WebhookOutcome, WorkflowClient};
use crate::meeting;
use crate::playbook_run_status::PlaybookRunStatus;
use crate::side_effect::SideEffect;
use crate::{action_items, meetings, playbook_runs, transcripts, Id};
use crm::{CrmManager, CrmNote, CrmTask, ErrorKind as CrmErrorKind};
use entity_api::playbook_run::{self, StatusChange};
use entity_api::{action_item, transcript};
use log::*;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use service::config::Config;
use std::fmt;
use std::str::FromStr;

/// Characters of the transcript copied into the CRM meeting note.
pub const NOTE_TRANSCRIPT_CHARS: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybookType {
    GhlSync,
    FollowUpEmail,
    TaskCreation,
    Custom,
}

impl PlaybookType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybookType::GhlSync => "ghl_sync",
            PlaybookType::FollowUpEmail => "follow_up_email",
            PlaybookType::TaskCreation => "task_creation",
            PlaybookType::Custom => "custom",
        }
    }
}

impl fmt::Display for PlaybookType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PlaybookType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ghl_sync" => Ok(PlaybookType::GhlSync),
            "follow_up_email" => Ok(PlaybookType::FollowUpEmail),
            "task_creation" => Ok(PlaybookType::TaskCreation),
            "custom" => Ok(PlaybookType::Custom),
            other => Err(Error::validation(format!("Unknown playbook type: {other}"))),
        }
    }
}

/// Allowed run status changes. Callbacks may skip `running`; terminal runs
/// never change again.
pub fn can_transition(from: PlaybookRunStatus, to: PlaybookRunStatus) -> bool {
    use PlaybookRunStatus::*;

    match from {
        Pending | Running => matches!(to, Running | Completed | Failed),
        Completed | Failed => false,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrmSyncReport {
    pub tasks_created: usize,
    pub tasks_failed: usize,
    pub note_created: bool,
}

#[derive(Debug)]
pub struct TriggerOutcome {
    pub run: playbook_runs::Model,
    pub execution_id: Option<String>,
    pub crm_sync: SideEffect<CrmSyncReport>,
}

/// Body of the CRM note that summarizes a meeting.
pub fn meeting_note(meeting: &meetings::Model, transcript: &transcripts::Model) -> String {
    let excerpt: String = transcript
        .raw_text
        .chars()
        .take(NOTE_TRANSCRIPT_CHARS)
        .collect();
    format!("Meeting: {}\n\n{excerpt}", meeting.title)
}

fn crm_task(item: &action_items::Model) -> CrmTask {
    CrmTask {
        title: item.title.clone(),
        body: item.description.clone(),
        assigned_to: item.assignee.clone(),
        due_date: item.due_date,
        priority: item.priority,
    }
}

/// Creates a run for the meeting and hands it to the workflow engine.
///
/// The webhook is called once. A `ghl_sync` playbook for a meeting with action
/// items also pushes its unsynced pending items and a transcript note to the
/// CRM; that sync is best effort and reported in `crm_sync`.
#[allow(clippy::too_many_arguments)]
pub async fn trigger(
    db: &DatabaseConnection,
    config: &Config,
    crm_manager: &CrmManager,
    organization_id: Id,
    user_id: Id,
    meeting_id: Option<Id>,
    playbook_type: Option<&str>,
    meta: &RequestMeta,
) -> Result<TriggerOutcome, Error> {
    let (Some(meeting_id), Some(playbook_type)) =
        (meeting_id, playbook_type.filter(|t| !t.is_empty()))
    else {
        return Err(Error::validation("Meeting ID and playbook type required"));
    };
    let playbook_type: PlaybookType = playbook_type.parse()?;

    let webhook_url = config
        .n8n_webhook_url()
        .ok_or_else(|| Error::config("n8n webhook not configured"))?;
    let client = WorkflowClient::new(&webhook_url)?;

    let meeting = meeting::find_by_id(db, organization_id, meeting_id).await?;
    let (action_items, transcript) = tokio::try_join!(
        action_item::find_by_meeting_id(db, organization_id, meeting.id),
        transcript::find_by_meeting_id(db, organization_id, meeting.id),
    )?;

    let payload = json!({
        "meeting": meeting,
        "actionItems": action_items,
        "transcript": transcript,
    });
    let run = playbook_run::create(
        db,
        organization_id,
        meeting.id,
        playbook_type.as_str(),
        payload,
    )
    .await?;

    let body = json!({
        "playbookRunId": run.id,
        "organizationId": organization_id,
        "meetingId": meeting.id,
        "playbookType": playbook_type.as_str(),
        "meeting": meeting,
        "actionItems": action_items,
        "transcript": transcript,
    });

    let failure = match client.trigger(&body).await {
        Ok(WebhookOutcome::Accepted { execution_id }) => {
            // A status callback may land before the webhook answers; it wins.
            let started =
                playbook_run::mark_running(db, organization_id, run.id, execution_id.clone())
                    .await?;
            let run = playbook_run::find_by_id(db, organization_id, run.id).await?;
            if started == 0 {
                info!(
                    "Playbook run {} ({playbook_type}) already {} when the webhook answered",
                    run.id, run.status
                );
            } else {
                info!(
                    "Playbook run {} ({playbook_type}) started, execution {execution_id:?}",
                    run.id
                );
            }

            let crm_sync = if playbook_type != PlaybookType::GhlSync {
                SideEffect::skipped(format!("{playbook_type} does not sync to the CRM"))
            } else if action_items.is_empty() {
                SideEffect::skipped("Meeting has no action items to sync")
            } else {
                SideEffect::from_result(
                    "CRM sync",
                    sync_to_crm(
                        db,
                        crm_manager,
                        organization_id,
                        user_id,
                        &meeting,
                        &action_items,
                        transcript.as_ref(),
                        meta,
                    )
                    .await,
                )
            };

            audit::log_event(
                db,
                AuditEvent::new(organization_id, Some(user_id), AuditAction::PlaybookTriggered)
                    .resource("playbook_run", run.id)
                    .details(json!({
                        "playbookType": playbook_type.as_str(),
                        "meetingId": meeting.id,
                        "executionId": execution_id,
                    }))
                    .meta(meta),
            )
            .await;

            return Ok(TriggerOutcome {
                run,
                execution_id,
                crm_sync,
            });
        }
        Ok(WebhookOutcome::Rejected { status_text, .. }) => {
            (format!("Webhook failed: {status_text}"), Error::upstream(status_text))
        }
        Err(err) => (format!("Webhook failed: {err}"), err),
    };

    let (error_message, err) = failure;
    error!("Playbook run {} failed: {error_message}", run.id);
    let change = StatusChange {
        status: PlaybookRunStatus::Failed,
        error_message: Some(error_message),
        ..Default::default()
    };
    if let Err(update_err) = playbook_run::update_status(db, run, change).await {
        warn!("Could not mark playbook run failed: {update_err}");
    }

    Err(err.with_context("Playbook trigger failed"))
}

/// Pushes each pending, unsynced item as a CRM task and the transcript as a note.
///
/// A missing connection aborts the sync; other per-item failures are counted
/// and the remaining items still go out.
#[allow(clippy::too_many_arguments)]
async fn sync_to_crm(
    db: &DatabaseConnection,
    crm_manager: &CrmManager,
    organization_id: Id,
    user_id: Id,
    meeting: &meetings::Model,
    action_items: &[action_items::Model],
    transcript: Option<&transcripts::Model>,
    meta: &RequestMeta,
) -> Result<CrmSyncReport, Error> {
    let mut report = CrmSyncReport::default();

    for item in action_items.iter().filter(|item| item.awaiting_crm_sync()) {
        match crm_manager
            .create_task(organization_id, CrmType::Ghl, &crm_task(item))
            .await
        {
            Ok(record) => {
                action_item::mark_synced(db, organization_id, item.id, &record.id).await?;
                report.tasks_created += 1;

                audit::log_event(
                    db,
                    AuditEvent::new(organization_id, Some(user_id), AuditAction::CrmTaskCreated)
                        .resource("action_item", item.id)
                        .details(json!({ "crmType": CrmType::Ghl, "taskId": record.id }))
                        .meta(meta),
                )
                .await;
            }
            Err(err) if matches!(err.error_kind, CrmErrorKind::NoActiveConnection(_)) => {
                return Err(err.into());
            }
            Err(err) => {
                warn!("CRM task for action item {} failed: {err}", item.id);
                report.tasks_failed += 1;
            }
        }
    }

    if let Some(transcript) = transcript {
        let note = CrmNote {
            body: meeting_note(meeting, transcript),
            contact_id: None,
        };
        match crm_manager
            .create_note(organization_id, CrmType::Ghl, &note)
            .await
        {
            Ok(record) => {
                report.note_created = true;

                audit::log_event(
                    db,
                    AuditEvent::new(organization_id, Some(user_id), AuditAction::CrmNoteCreated)
                        .resource("meeting", meeting.id)
                        .details(json!({ "crmType": CrmType::Ghl, "noteId": record.id }))
                        .meta(meta),
                )
                .await;
            }
            Err(err) => warn!("CRM note for meeting {} failed: {err}", meeting.id),
        }
    }

    debug!("CRM sync for meeting {}: {report:?}", meeting.id);
    Ok(report)
}

/// Applies a status callback from the workflow engine.
#[allow(clippy::too_many_arguments)]
pub async fn update_status(
    db: &DatabaseConnection,
    organization_id: Id,
    user_id: Id,
    run_id: Option<Id>,
    status: Option<&str>,
    result: Option<Value>,
    error_message: Option<String>,
    meta: &RequestMeta,
) -> Result<playbook_runs::Model, Error> {
    let (Some(run_id), Some(status)) = (run_id, status.filter(|s| !s.is_empty())) else {
        return Err(Error::validation("Playbook run ID and status required"));
    };
    let status: PlaybookRunStatus = status.parse().map_err(Error::validation)?;

    let run = playbook_run::find_by_id(db, organization_id, run_id)
        .await
        .map_err(|err| {
            let err = Error::from(err);
            if err.is_not_found() {
                Error::not_found("Playbook run not found")
            } else {
                err
            }
        })?;

    if !can_transition(run.status, status) {
        warn!(
            "Rejected playbook run {run_id} transition {} -> {status}",
            run.status
        );
        return Err(Error::invalid_transition(format!(
            "Cannot move playbook run from {} to {status}",
            run.status
        )));
    }

    let change = StatusChange {
        status,
        result,
        error_message,
        ..Default::default()
    };
    let updated = playbook_run::update_status(db, run, change)
        .await
        .map_err(|err| {
            error!("Updating playbook run {run_id} failed: {err}");
            Error::from(err).with_context("Failed to update playbook run")
        })?;

    if status == PlaybookRunStatus::Completed {
        audit::log_event(
            db,
            AuditEvent::new(organization_id, Some(user_id), AuditAction::PlaybookCompleted)
                .resource("playbook_run", run_id)
                .details(json!({ "playbookType": updated.playbook_type }))
                .meta(meta),
        )
        .await;
    }

    Ok(updated)
}
