//! Service configuration.

use std::path::PathBuf;

use enlist_config::{keys, AppConfig, ConfigError};
use enlist_core::ProjectId;

use crate::mail::MailSettings;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8010;

/// Service configuration resolved from the application configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Application name (default: "enlist").
    pub application: String,

    /// Project whose document store is used.
    pub project_id: ProjectId,

    /// HTTP port (default: 8010).
    pub port: u16,

    /// Root directory of the document store (default: "data").
    pub data_dir: PathBuf,

    /// Service API key for service-to-service auth.
    pub service_api_key: Option<String>,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// Mail server settings.
    pub mail: MailSettings,
}

impl ServiceConfig {
    /// Resolve the service configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingKey` if `projectid` is not set, or
    /// `ConfigError::Invalid` if a value cannot be used.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let raw_project = config.require_string(keys::PROJECT_ID)?;
        let project_id = ProjectId::new(raw_project).map_err(|e| ConfigError::Invalid {
            key: keys::PROJECT_ID.into(),
            reason: e.to_string(),
        })?;

        let port = match config.get_i64(keys::HTTP_PORT) {
            Some(port) => u16::try_from(port).map_err(|_| ConfigError::Invalid {
                key: keys::HTTP_PORT.into(),
                reason: format!("{port} is not a valid port"),
            })?,
            None => DEFAULT_PORT,
        };

        let defaults = Self::with_project(project_id);

        Ok(Self {
            application: config
                .get_string(keys::APPLICATION)
                .unwrap_or(defaults.application),
            port,
            data_dir: config
                .get_string(keys::STORE_DATA_DIR)
                .map_or(defaults.data_dir, PathBuf::from),
            service_api_key: config
                .get_string(keys::SERVICE_API_KEY)
                .filter(|k| !k.is_empty()),
            cors_origins: config
                .get_string_list(keys::HTTP_CORS_ORIGINS)
                .filter(|o| !o.is_empty())
                .unwrap_or(defaults.cors_origins),
            max_body_bytes: config
                .get_i64(keys::HTTP_MAX_BODY_BYTES)
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(defaults.max_body_bytes),
            request_timeout_seconds: config
                .get_i64(keys::HTTP_TIMEOUT_SECONDS)
                .and_then(|n| u64::try_from(n).ok())
                .unwrap_or(defaults.request_timeout_seconds),
            mail: MailSettings::from_config(config),
            project_id: defaults.project_id,
        })
    }

    /// Default configuration for `project_id`.
    #[must_use]
    pub fn with_project(project_id: ProjectId) -> Self {
        Self {
            application: "enlist".into(),
            project_id,
            port: DEFAULT_PORT,
            data_dir: PathBuf::from("data"),
            service_api_key: None,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
            mail: MailSettings::default(),
        }
    }

    /// Address to listen on.
    #[must_use]
    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
