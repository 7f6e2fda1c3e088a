use super::error::Error;
use chrono::Utc;
use entity::organizations::{ActiveModel, Entity, Model};
use entity::subscription_status::SubscriptionStatus;
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, TryIntoModel,
};
use slugify::slugify;

pub async fn create(
    db: &DatabaseConnection,
    name: &str,
    subscription_status: SubscriptionStatus,
    is_founding_member: bool,
) -> Result<Model, Error> {
    debug!("Creating organization {name}");

    let now = Utc::now();

    let active_model = ActiveModel {
        name: Set(name.to_string()),
        slug: Set(slugify!(name)),
        subscription_status: Set(subscription_status),
        is_founding_member: Set(is_founding_member),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.save(db).await?.try_into_model()?)
}

pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(Error::not_found)
}

/// Records the payment provider's customer id the first time an organization checks out.
pub async fn set_stripe_customer_id(
    db: &DatabaseConnection,
    id: Id,
    stripe_customer_id: &str,
) -> Result<Model, Error> {
    let organization = find_by_id(db, id).await?;

    let active_model = ActiveModel {
        id: Unchanged(organization.id),
        name: Unchanged(organization.name),
        slug: Unchanged(organization.slug),
        stripe_customer_id: Set(Some(stripe_customer_id.to_string())),
        stripe_subscription_id: Unchanged(organization.stripe_subscription_id),
        subscription_status: Unchanged(organization.subscription_status),
        is_founding_member: Unchanged(organization.is_founding_member),
        created_at: Unchanged(organization.created_at),
        updated_at: Set(Utc::now().into()),
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use crate::error::EntityApiErrorKind;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn test_model() -> Model {
        let now = Utc::now();
        Model {
            id: Id::new_v4(),
            name: "Acme Corp".to_string(),
            slug: "acme-corp".to_string(),
            stripe_customer_id: None,
            stripe_subscription_id: None,
            subscription_status: SubscriptionStatus::Inactive,
            is_founding_member: false,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn find_by_id_returns_not_found_for_unknown_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<Model, Vec<Model>, _>(vec![vec![]])
            .into_connection();

        let result = find_by_id(&db, Id::new_v4()).await;

        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotFound
        );
    }

    #[tokio::test]
    async fn set_stripe_customer_id_stores_the_customer() -> Result<(), Error> {
        let organization = test_model();
        let mut updated = organization.clone();
        updated.stripe_customer_id = Some("cus_123".to_string());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![organization.clone()]])
            .append_query_results(vec![vec![updated.clone()]])
            .into_connection();

        let result = set_stripe_customer_id(&db, organization.id, "cus_123").await?;

        assert_eq!(result.stripe_customer_id.as_deref(), Some("cus_123"));
        Ok(())
    }
}
