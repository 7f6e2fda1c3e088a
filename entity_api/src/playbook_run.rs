//! CRUD operations for playbook_runs.

use super::error::Error;
use chrono::Utc;
use entity::playbook_run_status::PlaybookRunStatus;
use entity::playbook_runs::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, QueryOrder, QuerySelect, TryIntoModel,
};

/// Fields a status change may touch. `None` leaves the column as it is.
#[derive(Clone, Debug, Default)]
pub struct StatusChange {
    pub status: PlaybookRunStatus,
    pub n8n_execution_id: Option<String>,
    pub result: Option<Json>,
    pub error_message: Option<String>,
}

/// Creates a run in `pending` carrying the payload that will be sent to the workflow engine.
pub async fn create(
    db: &DatabaseConnection,
    organization_id: Id,
    meeting_id: Id,
    playbook_type: &str,
    payload: Json,
) -> Result<Model, Error> {
    debug!("Creating {playbook_type} playbook run for meeting {meeting_id}");

    let active_model = ActiveModel {
        organization_id: Set(organization_id),
        meeting_id: Set(meeting_id),
        playbook_type: Set(playbook_type.to_string()),
        status: Set(PlaybookRunStatus::Pending),
        payload: Set(Some(payload)),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.save(db).await?.try_into_model()?)
}

pub async fn find_by_id(
    db: &DatabaseConnection,
    organization_id: Id,
    id: Id,
) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .filter(Column::OrganizationId.eq(organization_id))
        .one(db)
        .await?
        .ok_or_else(Error::not_found)
}

pub async fn find_recent(
    db: &DatabaseConnection,
    organization_id: Id,
    limit: u64,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::OrganizationId.eq(organization_id))
        .order_by_desc(Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await?)
}

/// Moves a run from `pending` to `running` and stamps `started_at`.
/// Returns the rows changed: 0 when the run has already left `pending`.
pub async fn mark_running(
    db: &DatabaseConnection,
    organization_id: Id,
    id: Id,
    execution_id: Option<String>,
) -> Result<u64, Error> {
    let mut change = ActiveModel {
        status: Set(PlaybookRunStatus::Running),
        started_at: Set(Some(Utc::now().into())),
        ..Default::default()
    };
    if let Some(execution_id) = execution_id {
        change.n8n_execution_id = Set(Some(execution_id));
    }

    let result = Entity::update_many()
        .set(change)
        .filter(Column::Id.eq(id))
        .filter(Column::OrganizationId.eq(organization_id))
        .filter(Column::Status.eq(PlaybookRunStatus::Pending))
        .exec(db)
        .await?;

    debug!(
        "Marked playbook run {id} running: {} row(s)",
        result.rows_affected
    );

    Ok(result.rows_affected)
}

/// Applies `change` to an already loaded run. Terminal statuses stamp `completed_at`.
pub async fn update_status(
    db: &DatabaseConnection,
    run: Model,
    change: StatusChange,
) -> Result<Model, Error> {
    debug!(
        "Updating playbook run {} status: {} -> {}",
        run.id, run.status, change.status
    );

    let now = Utc::now();

    let active_model = ActiveModel {
        id: Unchanged(run.id),
        organization_id: Unchanged(run.organization_id),
        meeting_id: Unchanged(run.meeting_id),
        playbook_type: Unchanged(run.playbook_type),
        status: Set(change.status),
        n8n_execution_id: match change.n8n_execution_id {
            Some(execution_id) => Set(Some(execution_id)),
            None => Unchanged(run.n8n_execution_id),
        },
        payload: Unchanged(run.payload),
        result: match change.result {
            Some(result) => Set(Some(result)),
            None => Unchanged(run.result),
        },
        error_message: match change.error_message {
            Some(message) => Set(Some(message)),
            None => Unchanged(run.error_message),
        },
        started_at: Unchanged(run.started_at),
        completed_at: if change.status.is_terminal() {
            Set(Some(now.into()))
        } else {
            Unchanged(run.completed_at)
        },
        created_at: Unchanged(run.created_at),
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use serde_json::json;

    fn test_model() -> Model {
        Model {
            id: Id::new_v4(),
            organization_id: Id::new_v4(),
            meeting_id: Id::new_v4(),
            playbook_type: "ghl_sync".to_string(),
            status: PlaybookRunStatus::Pending,
            n8n_execution_id: None,
            payload: Some(json!({"meeting": {}})),
            result: None,
            error_message: None,
            started_at: None,
            completed_at: None,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn create_returns_a_pending_run() -> Result<(), Error> {
        let run = test_model();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![run.clone()]])
            .into_connection();

        let result = create(
            &db,
            run.organization_id,
            run.meeting_id,
            "ghl_sync",
            json!({"meeting": {}}),
        )
        .await?;

        assert_eq!(result.status, PlaybookRunStatus::Pending);
        Ok(())
    }

    #[tokio::test]
    async fn mark_running_only_touches_pending_runs() -> Result<(), Error> {
        let run = test_model();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let rows = mark_running(
            &db,
            run.organization_id,
            run.id,
            Some("exec-1".to_string()),
        )
        .await?;

        assert_eq!(rows, 0);

        let log = db.into_transaction_log();
        let sql = &log[0].statements()[0].sql;
        assert!(sql.starts_with(r#"UPDATE "meetingmind"."playbook_runs""#));
        assert!(sql.contains(r#""started_at""#));
        assert!(sql.contains("WHERE"));
        Ok(())
    }

    #[tokio::test]
    async fn update_status_sends_an_update_statement() -> Result<(), Error> {
        let run = test_model();
        let mut completed = run.clone();
        completed.status = PlaybookRunStatus::Completed;
        completed.completed_at = Some(Utc::now().into());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![completed.clone()]])
            .into_connection();

        let result = update_status(
            &db,
            run,
            StatusChange {
                status: PlaybookRunStatus::Completed,
                result: Some(json!({"ok": true})),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(result.status, PlaybookRunStatus::Completed);
        assert!(result.completed_at.is_some());

        let log = db.into_transaction_log();
        let sql = &log[0].statements()[0].sql;
        assert!(sql.starts_with(r#"UPDATE "meetingmind"."playbook_runs""#));
        assert!(sql.contains(r#""completed_at""#));
        Ok(())
    }
}
