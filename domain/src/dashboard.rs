//! The organization overview shown after sign-in.

use crate::error::Error;
use crate::tenancy::has_active_access;
use crate::{action_items, meetings, organizations, playbook_runs};
use entity_api::{action_item, meeting, playbook_run};
use sea_orm::DatabaseConnection;
use serde::Serialize;

pub const RECENT_MEETINGS: u64 = 20;
pub const OPEN_ACTION_ITEMS: u64 = 50;
pub const RECENT_PLAYBOOK_RUNS: u64 = 10;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub organization: organizations::Model,
    pub has_active_access: bool,
    pub meetings: Vec<meetings::Model>,
    pub action_items: Vec<action_items::Model>,
    pub playbook_runs: Vec<playbook_runs::Model>,
}

pub async fn load(
    db: &DatabaseConnection,
    organization: organizations::Model,
) -> Result<Dashboard, Error> {
    let organization_id = organization.id;

    let (meetings, action_items, playbook_runs) = tokio::try_join!(
        meeting::find_recent(db, organization_id, RECENT_MEETINGS),
        action_item::find_open(db, organization_id, OPEN_ACTION_ITEMS),
        playbook_run::find_recent(db, organization_id, RECENT_PLAYBOOK_RUNS),
    )?;

    Ok(Dashboard {
        has_active_access: has_active_access(&organization),
        organization,
        meetings,
        action_items,
        playbook_runs,
    })
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use crate::meeting_status::MeetingStatus;
    use crate::subscription_status::SubscriptionStatus;
    use crate::tenancy::test_models;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn load_scopes_every_lookup_to_the_organization() -> Result<(), Error> {
        let organization = test_models::organization(SubscriptionStatus::Trialing);
        let meeting = test_models::meeting(organization.id, MeetingStatus::Analyzed);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![meeting.clone()]])
            .append_query_results::<action_items::Model, Vec<action_items::Model>, _>(vec![
                vec![],
            ])
            .append_query_results::<playbook_runs::Model, Vec<playbook_runs::Model>, _>(vec![
                vec![],
            ])
            .into_connection();

        let dashboard = load(&db, organization.clone()).await?;

        assert!(dashboard.has_active_access);
        assert_eq!(dashboard.meetings, vec![meeting]);

        let log = db.into_transaction_log();
        assert_eq!(log.len(), 3);
        for transaction in log {
            let sql = &transaction.statements()[0].sql;
            assert!(sql.contains("\"organization_id\" = $1"), "{sql}");
        }

        Ok(())
    }
}
