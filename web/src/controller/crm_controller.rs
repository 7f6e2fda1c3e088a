use crate::extractors::{authenticated_user::AuthenticatedUser, request_meta::ClientMeta};
use crate::params::crm::CallbackQuery;
use crate::{AppState, Error};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect};
use axum::Json;
use domain::crm_connection as CrmConnectionApi;
use domain::crm_type::CrmType;
use log::*;
use serde_json::json;

/// GET redirect the browser to the GoHighLevel consent screen
#[utoipa::path(
    get,
    path = "/crm/ghl/connect",
    responses(
        (status = 307, description = "Redirect to the GoHighLevel authorize URL"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "GHL client ID not configured"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn connect(
    AuthenticatedUser {
        profile,
        organization,
    }: AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Connect GHL for organization {}", organization.id);

    let url = CrmConnectionApi::connect_url(&app_state.config, profile.id, organization.id)?;

    Ok(Redirect::temporary(&url))
}

/// GET OAuth redirect target; always answers with a redirect into the app
#[utoipa::path(
    get,
    path = "/crm/ghl/callback",
    params(CallbackQuery),
    responses(
        (status = 307, description = "Redirect to the dashboard (or to login when the state is invalid)"),
    )
)]
pub async fn callback(
    ClientMeta(meta): ClientMeta,
    State(app_state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> impl IntoResponse {
    let outcome = CrmConnectionApi::complete_callback(
        app_state.db_conn_ref(),
        &app_state.config,
        query.into(),
        &meta,
    )
    .await;
    debug!("GHL callback finished: {outcome:?}");

    Redirect::temporary(&format!(
        "{}{}",
        app_state.config.app_base_url(),
        outcome.redirect_path()
    ))
}

/// GET whether the organization has a working GoHighLevel connection
#[utoipa::path(
    get,
    path = "/crm/ghl/status",
    responses(
        (status = 200, description = "`{connected, valid, accountName}`"),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn status(
    AuthenticatedUser { organization, .. }: AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    let status =
        CrmConnectionApi::status(&app_state.crm_manager, organization.id, CrmType::Ghl).await?;

    Ok((StatusCode::OK, Json(status)))
}

/// DELETE the organization's GoHighLevel connection
#[utoipa::path(
    delete,
    path = "/crm/ghl",
    responses(
        (status = 200, description = "`{success}`"),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn disconnect(
    AuthenticatedUser {
        profile,
        organization,
    }: AuthenticatedUser,
    ClientMeta(meta): ClientMeta,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE GHL connection of organization {}", organization.id);

    CrmConnectionApi::disconnect(
        app_state.db_conn_ref(),
        organization.id,
        profile.id,
        CrmType::Ghl,
        &meta,
    )
    .await?;

    Ok((StatusCode::OK, Json(json!({ "success": true }))))
}
