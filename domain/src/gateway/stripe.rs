//! Stripe API client for checkout sessions.

use super::bearer_headers;
use crate::error::Error;
use crate::Id;
use log::*;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct CustomerResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CheckoutSessionResponse {
    url: Option<String>,
}

/// Parameters of a subscription-mode checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest<'a> {
    pub customer_id: &'a str,
    pub price_id: &'a str,
    pub success_url: String,
    pub cancel_url: String,
    pub organization_id: Id,
}

pub struct StripeClient {
    client: reqwest::Client,
    base_url: String,
}

impl StripeClient {
    pub fn new(secret_key: &str, base_url: &str) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .default_headers(bearer_headers(secret_key)?)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Creates a customer tagged with the organization id and returns its id.
    pub async fn create_customer(&self, email: &str, organization_id: Id) -> Result<String, Error> {
        let url = format!("{}/customers", self.base_url);
        let organization_id = organization_id.to_string();

        let response = self
            .client
            .post(&url)
            .form(&[
                ("email", email),
                ("metadata[organizationId]", organization_id.as_str()),
            ])
            .send()
            .await?;

        if response.status().is_success() {
            let customer: CustomerResponse = response.json().await?;
            info!("Created Stripe customer {}", customer.id);
            Ok(customer.id)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            error!("Stripe API: {}", error_text);
            Err(Error::upstream(error_text))
        }
    }

    /// Creates a checkout session and returns the hosted payment page URL.
    pub async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest<'_>,
    ) -> Result<String, Error> {
        let url = format!("{}/checkout/sessions", self.base_url);
        let organization_id = request.organization_id.to_string();

        let response = self
            .client
            .post(&url)
            .form(&[
                ("customer", request.customer_id),
                ("mode", "subscription"),
                ("payment_method_types[0]", "card"),
                ("line_items[0][price]", request.price_id),
                ("line_items[0][quantity]", "1"),
                ("success_url", request.success_url.as_str()),
                ("cancel_url", request.cancel_url.as_str()),
                ("metadata[organizationId]", organization_id.as_str()),
            ])
            .send()
            .await?;

        if response.status().is_success() {
            let session: CheckoutSessionResponse = response.json().await?;
            session
                .url
                .ok_or_else(|| Error::upstream("Checkout session has no url"))
        } else {
            let error_text = response.text().await.unwrap_or_default();
            error!("Stripe API: {}", error_text);
            Err(Error::upstream(error_text))
        }
    }
}
