//! Enlist Service - HTTP API for subscriptions and account transfers.
//!
//! This is the main entry point for the enlist service.

use enlist_config::AppConfig;
use enlist_service::{create_router, telemetry, AppState, ServiceConfig};
use enlist_store::StoreFactory;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let log_filter = telemetry::init();
    tracing::info!("Starting Enlist Service");

    let app_config = AppConfig::load()?;
    telemetry::apply_config_level(&log_filter, &app_config);

    let app_config = app_config.attach_remote().await;
    let config = ServiceConfig::from_app_config(&app_config)?;

    tracing::info!(
        application = %config.application,
        project_id = %config.project_id,
        listen_addr = %config.listen_addr(),
        data_dir = %config.data_dir.display(),
        remote_config = app_config.has_remote(),
        mail_configured = config.mail.is_configured(),
        "Service configuration loaded"
    );

    let store = StoreFactory::open(&config.data_dir, config.project_id.clone())?;
    // Fail startup if the store cannot be reached.
    drop(store.connect()?);

    config.mail.init();

    let state = AppState::new(store, config.clone());
    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    tracing::info!(listen_addr = %config.listen_addr(), "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(config.listen_addr()).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
