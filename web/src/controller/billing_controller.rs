use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::{AppState, Error};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::billing as BillingApi;
use log::*;
use serde_json::json;

/// POST start a subscription checkout for the caller's organization
#[utoipa::path(
    post,
    path = "/billing/create-checkout",
    responses(
        (status = 200, description = "Hosted checkout page URL as `{url}`"),
        (status = 400, description = "Already subscribed"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Failed to create checkout session"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_checkout(
    AuthenticatedUser {
        profile,
        organization,
    }: AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Create checkout for organization {}", organization.id);

    let url = BillingApi::create_checkout(
        app_state.db_conn_ref(),
        &app_state.config,
        &profile,
        &organization,
    )
    .await?;

    Ok((StatusCode::OK, Json(json!({ "url": url }))))
}
