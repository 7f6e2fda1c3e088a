//! Resolution of the caller's organization and access checks.

use crate::error::Error;
use crate::organizations;
use crate::subscription_status::SubscriptionStatus;
use crate::user_profiles;
use crate::Id;
use entity_api::{organization, user_profile};
use log::*;
use sea_orm::DatabaseConnection;

/// Loads the caller's profile and the organization it belongs to.
///
/// A profile without an organization is reported as not found: such a user
/// has no tenant to act in.
pub async fn current_organization(
    db: &DatabaseConnection,
    user_id: Id,
) -> Result<(user_profiles::Model, organizations::Model), Error> {
    let profile = user_profile::find_by_id(db, user_id).await?;

    let organization_id = profile.organization_id.ok_or_else(|| {
        debug!("User {user_id} has no organization");
        Error::not_found("Organization not found")
    })?;

    let organization = organization::find_by_id(db, organization_id).await?;

    Ok((profile, organization))
}

/// Paying, trialing, or founding-member organizations may use the product.
pub fn has_active_access(organization: &organizations::Model) -> bool {
    organization.is_founding_member
        || matches!(
            organization.subscription_status,
            SubscriptionStatus::Active | SubscriptionStatus::Trialing
        )
}


#[cfg(test)]
mod tests {
    use super::test_models::*;
    use super::*;

    #[test]
    fn active_and_trialing_have_access() {
        assert!(has_active_access(&organization(SubscriptionStatus::Active)));
        assert!(has_active_access(&organization(SubscriptionStatus::Trialing)));
        assert!(!has_active_access(&organization(SubscriptionStatus::PastDue)));
        assert!(!has_active_access(&organization(SubscriptionStatus::Inactive)));
    }

    #[test]
    fn founding_members_bypass_subscription() {
        let mut org = organization(SubscriptionStatus::Canceled);
        org.is_founding_member = true;

        assert!(has_active_access(&org));
    }

    #[cfg(feature = "mock")]
    mod db {
        use super::*;
        use sea_orm::{DatabaseBackend, MockDatabase};

        #[tokio::test]
        async fn current_organization_loads_profile_then_organization() -> Result<(), Error> {
            let org = organization(SubscriptionStatus::Active);
            let user = profile(Some(org.id));
            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results(vec![vec![user.clone()]])
                .append_query_results(vec![vec![org.clone()]])
                .into_connection();

            let (found_profile, found_org) = current_organization(&db, user.id).await?;

            assert_eq!(found_profile.id, user.id);
            assert_eq!(found_org.id, org.id);
            Ok(())
        }

        #[tokio::test]
        async fn user_without_organization_is_not_found() {
            let user = profile(None);
            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results(vec![vec![user.clone()]])
                .into_connection();

            let err = current_organization(&db, user.id).await.unwrap_err();

            assert!(err.is_not_found());
        }
    }
}
