//! Error types for configuration loading.

use std::path::PathBuf;

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading or reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No configuration file was found in any search directory.
    #[error("configuration file {name} not found (searched {searched:?})")]
    FileNotFound {
        /// File name that was looked for.
        name: String,
        /// Directories that were searched, in order.
        searched: Vec<PathBuf>,
    },

    /// The configuration file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path of the file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration document is not valid JSON.
    #[error("failed to parse configuration from {origin}: {source}")]
    Parse {
        /// File path or remote location.
        origin: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// A configuration document is valid JSON but not an object.
    #[error("configuration from {0} is not a JSON object")]
    NotAnObject(String),

    /// A required key is not set.
    #[error("required configuration key not set: {0}")]
    MissingKey(String),

    /// A key is set but its value cannot be used.
    #[error("invalid value for configuration key {key}: {reason}")]
    Invalid {
        /// The offending key.
        key: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The remote provider could not be reached.
    #[error("remote configuration request failed: {0}")]
    Remote(#[from] reqwest::Error),

    /// The remote provider answered with a non-success status.
    #[error("remote configuration provider returned status {status}")]
    RemoteStatus {
        /// HTTP status code.
        status: u16,
    },

    /// The configured remote provider is not supported.
    #[error("unsupported remote configuration provider: {0}")]
    UnsupportedProvider(String),
}
