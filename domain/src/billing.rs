//! Subscription checkout through the payment provider.

use crate::error::Error;
use crate::gateway::stripe::{CheckoutSessionRequest, StripeClient};
use crate::subscription_status::SubscriptionStatus;
use crate::{organizations, user_profiles};
use entity_api::organization;
use log::*;
use sea_orm::DatabaseConnection;
use service::config::Config;

/// Founding members and active subscribers have nothing to buy.
pub fn is_subscribed(organization: &organizations::Model) -> bool {
    organization.is_founding_member
        || organization.subscription_status == SubscriptionStatus::Active
}

/// Starts a subscription checkout and returns the hosted checkout page URL.
///
/// The organization's payment-provider customer is created on first checkout
/// and remembered for later ones.
pub async fn create_checkout(
    db: &DatabaseConnection,
    config: &Config,
    profile: &user_profiles::Model,
    organization: &organizations::Model,
) -> Result<String, Error> {
    if is_subscribed(organization) {
        return Err(Error::validation("Already subscribed"));
    }

    checkout_session(db, config, profile, organization)
        .await
        .map_err(|err| {
            error!(
                "Checkout for organization {} failed: {err}",
                organization.id
            );
            err.with_context("Failed to create checkout session")
        })
}

async fn checkout_session(
    db: &DatabaseConnection,
    config: &Config,
    profile: &user_profiles::Model,
    organization: &organizations::Model,
) -> Result<String, Error> {
    let secret_key = config
        .stripe_secret_key()
        .ok_or_else(|| Error::config("Stripe secret key not configured"))?;
    let price_id = config
        .stripe_price_id()
        .ok_or_else(|| Error::config("Stripe price ID not configured"))?;

    let client = StripeClient::new(&secret_key, config.stripe_base_url())?;

    let customer_id = match &organization.stripe_customer_id {
        Some(customer_id) => customer_id.clone(),
        None => {
            let customer_id = client.create_customer(&profile.email, organization.id).await?;
            organization::set_stripe_customer_id(db, organization.id, &customer_id).await?;
            info!(
                "Created Stripe customer {customer_id} for organization {}",
                organization.id
            );
            customer_id
        }
    };

    let app_url = config.app_base_url();
    client
        .create_checkout_session(CheckoutSessionRequest {
            customer_id: &customer_id,
            price_id: &price_id,
            success_url: format!("{app_url}/billing/success?session_id={{CHECKOUT_SESSION_ID}}"),
            cancel_url: format!("{app_url}/billing"),
            organization_id: organization.id,
        })
        .await
}
