use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::{AppState, Error};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::dashboard as DashboardApi;
use log::*;

/// GET the organization overview: recent meetings, open action items and playbook runs
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "`{organization, hasActiveAccess, meetings, actionItems, playbookRuns}`"),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn index(
    AuthenticatedUser { organization, .. }: AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Dashboard for organization {}", organization.id);

    let dashboard = DashboardApi::load(app_state.db_conn_ref(), organization).await?;

    Ok((StatusCode::OK, Json(dashboard)))
}
