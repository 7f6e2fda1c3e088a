use axum::http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use domain::crm_connection::{self, CrmManager};
use log::*;
use sea_orm::DatabaseConnection;
use service::config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use self::error::{Error, Result};

mod controller;
mod error;
mod extractors;
mod params;
pub mod router;

/// Request-handler state: the infrastructure from `service` plus the CRM
/// adapters, built once at startup and shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub database_connection: Arc<DatabaseConnection>,
    pub config: Config,
    pub crm_manager: Arc<CrmManager>,
}

impl AppState {
    pub fn new(service_state: service::AppState) -> Result<Self> {
        let crm_manager = crm_connection::crm_manager(
            &service_state.config,
            Arc::clone(&service_state.database_connection),
        )?;

        Ok(Self {
            database_connection: service_state.database_connection,
            config: service_state.config,
            crm_manager: Arc::new(crm_manager),
        })
    }

    pub fn db_conn_ref(&self) -> &DatabaseConnection {
        self.database_connection.as_ref()
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid allowed origin: {origin}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_methods([Method::DELETE, Method::GET, Method::OPTIONS, Method::POST])
        .allow_credentials(true)
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_origin(origins)
}

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let host = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let server_url = format!("{host}:{}", app_state.config.port);

    info!(
        "Server starting... listening for connections on http://{server_url} [{}]",
        app_state.config.runtime_env()
    );

    let listener = TcpListener::bind(&server_url).await?;
    let cors = cors_layer(&app_state.config);

    axum::serve(listener, router::define_routes(app_state).layer(cors)).await
}
