//! Append-only audit trail of significant actions.

use crate::audit_logs::Model;
use crate::error::Error;
use crate::side_effect::SideEffect;
use crate::Id;
use entity_api::audit_log::{self, NewAuditLog};
use log::*;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    MeetingTranscribed,
    MeetingAnalyzed,
    CrmConnected,
    CrmDisconnected,
    CrmTaskCreated,
    CrmNoteCreated,
    PlaybookTriggered,
    PlaybookCompleted,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::MeetingTranscribed => "meeting.transcribed",
            AuditAction::MeetingAnalyzed => "meeting.analyzed",
            AuditAction::CrmConnected => "crm.connected",
            AuditAction::CrmDisconnected => "crm.disconnected",
            AuditAction::CrmTaskCreated => "crm.task_created",
            AuditAction::CrmNoteCreated => "crm.note_created",
            AuditAction::PlaybookTriggered => "playbook.triggered",
            AuditAction::PlaybookCompleted => "playbook.completed",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Caller details recorded with every audit entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// First `x-forwarded-for` entry, else `x-real-ip`.
pub fn client_ip(forwarded_for: Option<&str>, real_ip: Option<&str>) -> Option<String> {
    forwarded_for
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .or_else(|| real_ip.map(str::trim).filter(|ip| !ip.is_empty()))
        .map(str::to_string)
}

#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub organization_id: Id,
    pub user_id: Option<Id>,
    pub action: AuditAction,
    pub resource_type: Option<&'static str>,
    pub resource_id: Option<Id>,
    pub details: Option<Value>,
    pub meta: RequestMeta,
}

impl AuditEvent {
    pub fn new(organization_id: Id, user_id: Option<Id>, action: AuditAction) -> Self {
        Self {
            organization_id,
            user_id,
            action,
            resource_type: None,
            resource_id: None,
            details: None,
            meta: RequestMeta::default(),
        }
    }

    pub fn resource(mut self, resource_type: &'static str, resource_id: Id) -> Self {
        self.resource_type = Some(resource_type);
        self.resource_id = Some(resource_id);
        self
    }

    pub fn details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn meta(mut self, meta: &RequestMeta) -> Self {
        self.meta = meta.clone();
        self
    }
}

/// Appends an audit entry. Failures are logged and reported, never returned as errors.
pub async fn log_event(db: &DatabaseConnection, event: AuditEvent) -> SideEffect<Model> {
    debug!(
        "Audit {} for organization {}",
        event.action, event.organization_id
    );

    let entry = NewAuditLog {
        organization_id: event.organization_id,
        user_id: event.user_id,
        action_type: event.action.as_str().to_string(),
        resource_type: event.resource_type.map(str::to_string),
        resource_id: event.resource_id,
        details: event.details,
        ip_address: event.meta.ip_address,
        user_agent: event.meta.user_agent,
    };

    let result: Result<Model, Error> = audit_log::create(db, entry).await.map_err(Error::from);
    SideEffect::from_result("Audit log", result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_ip_prefers_first_forwarded_entry() {
        assert_eq!(
            client_ip(Some("203.0.113.7, 10.0.0.1"), Some("10.0.0.2")).as_deref(),
            Some("203.0.113.7")
        );
    }

    #[test]
    fn client_ip_falls_back_to_real_ip() {
        assert_eq!(client_ip(None, Some("198.51.100.4")).as_deref(), Some("198.51.100.4"));
        assert_eq!(client_ip(Some(""), Some("198.51.100.4")).as_deref(), Some("198.51.100.4"));
        assert_eq!(client_ip(None, None), None);
    }

    #[test]
    fn action_names_are_dotted() {
        assert_eq!(AuditAction::CrmTaskCreated.to_string(), "crm.task_created");
        assert_eq!(AuditAction::PlaybookCompleted.as_str(), "playbook.completed");
    }

    #[cfg(feature = "mock")]
    mod db {
        use super::*;
        use chrono::Utc;
        use sea_orm::{DatabaseBackend, MockDatabase};
        use serde_json::json;

        #[tokio::test]
        async fn log_event_reports_failure_instead_of_erroring() {
            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_errors(vec![sea_orm::DbErr::Custom("insert failed".into())])
                .into_connection();

            let effect = log_event(
                &db,
                AuditEvent::new(Id::new_v4(), None, AuditAction::MeetingAnalyzed),
            )
            .await;

            assert!(matches!(effect, SideEffect::Failed(_)));
        }

        #[tokio::test]
        async fn log_event_stores_the_action_name() {
            let organization_id = Id::new_v4();
            let meeting_id = Id::new_v4();
            let stored = Model {
                id: Id::new_v4(),
                organization_id,
                user_id: None,
                action_type: "meeting.analyzed".to_string(),
                resource_type: Some("meeting".to_string()),
                resource_id: Some(meeting_id),
                details: Some(json!({ "count": 2 })),
                ip_address: Some("203.0.113.7".to_string()),
                user_agent: None,
                created_at: Utc::now().into(),
            };
            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results(vec![vec![stored.clone()]])
                .into_connection();

            let effect = log_event(
                &db,
                AuditEvent::new(organization_id, None, AuditAction::MeetingAnalyzed)
                    .resource("meeting", meeting_id)
                    .details(json!({ "count": 2 }))
                    .meta(&RequestMeta {
                        ip_address: Some("203.0.113.7".to_string()),
                        user_agent: None,
                    }),
            )
            .await;

            assert_eq!(effect.completed(), Some(&stored));
            let log = db.into_transaction_log();
            assert!(log[0].statements()[0].sql.contains("INSERT INTO"));
        }
    }
}
