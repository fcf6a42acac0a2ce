//! Well-known configuration keys.
//!
//! Keys are dotted paths into the configuration document. The environment
//! override for a key is `ENLIST_` followed by the key upper-cased with dots
//! replaced by underscores (`smtp.host` is `ENLIST_SMTP_HOST`).

/// Base name of the configuration file.
pub const CONFIG_FILENAME: &str = "appconfig.json";

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "ENLIST_";

/// Application name, logged at startup.
pub const APPLICATION: &str = "application";
/// Project whose document store the service uses. Required.
pub const PROJECT_ID: &str = "projectid";

/// Remote provider name (`consul`).
pub const REMOTE_PROVIDER: &str = "remote.provider";
/// Remote provider endpoint, e.g. `http://localhost:8500`.
pub const REMOTE_ENDPOINT: &str = "remote.endpoint";
/// Path of the configuration document at the provider.
pub const REMOTE_PATH: &str = "remote.path";

/// Mail server host.
pub const SMTP_HOST: &str = "smtp.host";
/// Mail server port.
pub const SMTP_PORT: &str = "smtp.port";
/// Mail authentication identity.
pub const SMTP_IDENTITY: &str = "smtp.identity";
/// Mail user name.
pub const SMTP_USER: &str = "smtp.user";
/// Mail password.
pub const SMTP_SECRET: &str = "smtp.secret";
/// Sender address for outgoing mail.
pub const SMTP_SENDER: &str = "smtp.sender";

/// HTTP listen port.
pub const HTTP_PORT: &str = "service.http.port";
/// Maximum request body size in bytes.
pub const HTTP_MAX_BODY_BYTES: &str = "service.http.maxbodybytes";
/// Request timeout in seconds.
pub const HTTP_TIMEOUT_SECONDS: &str = "service.http.timeoutseconds";
/// CORS origins, as a list or a comma separated string.
pub const HTTP_CORS_ORIGINS: &str = "service.http.corsorigins";
/// API key required by service-to-service endpoints.
pub const SERVICE_API_KEY: &str = "service.apikey";

/// Root directory of the document store.
pub const STORE_DATA_DIR: &str = "store.datadir";

/// Default log filter when `RUST_LOG` is not set.
pub const LOG_LEVEL: &str = "log.level";

/// Environment variable overriding `key`.
#[must_use]
pub fn env_var_name(key: &str) -> String {
    format!("{ENV_PREFIX}{}", key.replace('.', "_").to_uppercase())
}
