use crate::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::controller::{
    billing_controller, crm_controller, dashboard_controller, health_check_controller,
    meeting_controller, playbook_controller,
};
use crate::params;

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI document. To be a part
// of the rendered document, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "MeetingMind Platform API"
        ),
        paths(
            billing_controller::create_checkout,
            crm_controller::connect,
            crm_controller::callback,
            crm_controller::status,
            crm_controller::disconnect,
            dashboard_controller::index,
            health_check_controller::health_check,
            meeting_controller::transcribe,
            meeting_controller::analyze,
            meeting_controller::read,
            playbook_controller::trigger,
            playbook_controller::update_status,
        ),
        components(
            schemas(
                domain::action_items::Model,
                domain::meetings::Model,
                domain::organizations::Model,
                domain::playbook_runs::Model,
                domain::transcripts::Model,
                params::meeting::MeetingParams,
                params::playbook::TriggerParams,
                params::playbook::StatusParams,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "meetingmind_platform", description = "MeetingMind meeting intelligence API")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Requests authenticate with the auth provider's access token in an
// `Authorization: Bearer <jwt>` header.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token issued by the auth provider"))
                        .build(),
                ),
            )
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(billing_routes(app_state.clone()))
        .merge(crm_routes(app_state.clone()))
        .merge(dashboard_routes(app_state.clone()))
        .merge(health_routes())
        .merge(meeting_routes(app_state.clone()))
        .merge(playbook_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn billing_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/billing/create-checkout",
            post(billing_controller::create_checkout),
        )
        .with_state(app_state)
}

fn crm_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/crm/ghl/connect", get(crm_controller::connect))
        .route("/crm/ghl/callback", get(crm_controller::callback))
        .route("/crm/ghl/status", get(crm_controller::status))
        .route("/crm/ghl", delete(crm_controller::disconnect))
        .with_state(app_state)
}

fn dashboard_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/dashboard", get(dashboard_controller::index))
        .with_state(app_state)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn meeting_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/meetings/transcribe", post(meeting_controller::transcribe))
        .route("/meetings/analyze", post(meeting_controller::analyze))
        .route("/meetings/{id}", get(meeting_controller::read))
        .with_state(app_state)
}

fn playbook_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/playbooks/trigger", post(playbook_controller::trigger))
        .route("/playbooks/status", post(playbook_controller::update_status))
        .with_state(app_state)
}
