//! Application state.

use enlist_store::StoreFactory;

use crate::config::ServiceConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Handle factory for the project's document store.
    pub store: StoreFactory,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: StoreFactory, config: ServiceConfig) -> Self {
        if config.service_api_key.is_none() {
            tracing::warn!(
                "Service API key not configured - transfer endpoint will reject all requests"
            );
        }

        Self { store, config }
    }

    /// Check if a mail server is configured.
    #[must_use]
    pub fn has_mail(&self) -> bool {
        self.config.mail.is_configured()
    }
}
