//! Health check handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status, `ok` or `degraded`.
    pub status: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
    /// Project whose store is in use.
    pub project_id: String,
    /// Whether the document store answered.
    pub store_reachable: bool,
    /// Whether a mail server is configured.
    pub mail_configured: bool,
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let store_reachable = state.store.connect().is_ok();

    Json(HealthResponse {
        status: if store_reachable { "ok" } else { "degraded" }.to_string(),
        service: state.config.application.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        project_id: state.config.project_id.to_string(),
        store_reachable,
        mail_configured: state.has_mail(),
    })
}
