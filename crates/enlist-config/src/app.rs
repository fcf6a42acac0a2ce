//! Application configuration built once at startup.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::{ConfigError, Result};
use crate::keys;
use crate::remote::{provider_for, RemoteProvider};

/// Layered, read-only application configuration.
///
/// A key is looked up in the remote document (when one was loaded and sets
/// the key), then in the `ENLIST_*` environment overrides, then in the
/// configuration file.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    file: Map<String, Value>,
    env: BTreeMap<String, String>,
    remote: Option<Map<String, Value>>,
    source: Option<PathBuf>,
}

/// A raw configuration value from one of the layers.
enum Setting<'a> {
    Json(&'a Value),
    Env(&'a str),
}

impl AppConfig {
    /// Load `appconfig.json` from the default search directories, with
    /// overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::FileNotFound` if no file is found, or an I/O or
    /// parse error if the file cannot be used.
    pub fn load() -> Result<Self> {
        Self::load_from(&default_search_dirs(), std::env::vars())
    }

    /// Load `appconfig.json` from the first of `dirs` that has it, with
    /// overrides taken from `vars`.
    ///
    /// # Errors
    ///
    /// Same as [`AppConfig::load`].
    pub fn load_from<I>(dirs: &[PathBuf], vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        tracing::info!("Loading configuration");

        let path = locate(keys::CONFIG_FILENAME, dirs).ok_or_else(|| {
            ConfigError::FileNotFound {
                name: keys::CONFIG_FILENAME.to_string(),
                searched: dirs.to_vec(),
            }
        })?;

        let file = read_document(&path)?;
        tracing::info!(path = %path.display(), "Loaded configuration file");

        Ok(Self {
            file,
            source: Some(path),
            ..Self::default()
        }
        .with_env(vars))
    }

    /// Build a configuration from an in-memory document, with no environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotAnObject` if `document` is not a JSON object.
    pub fn from_value(document: Value) -> Result<Self> {
        match document {
            Value::Object(file) => Ok(Self {
                file,
                ..Self::default()
            }),
            _ => Err(ConfigError::NotAnObject("inline document".into())),
        }
    }

    /// Keep the `ENLIST_*` entries of `vars` as environment overrides.
    #[must_use]
    pub fn with_env<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.env = vars
            .into_iter()
            .filter(|(name, _)| name.starts_with(keys::ENV_PREFIX))
            .collect();
        self
    }

    /// Fetch the remote document if `remote.provider`, `remote.endpoint` and
    /// `remote.path` are all set.
    ///
    /// A failure is logged and the configuration continues without the remote
    /// layer.
    pub async fn attach_remote(mut self) -> Self {
        let Some((provider, endpoint, path)) = self.remote_settings() else {
            return self;
        };

        let result = match provider_for(&provider, &endpoint, &path) {
            Ok(remote) => self.load_remote(remote.as_ref()).await,
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            tracing::warn!(
                provider = %provider,
                endpoint = %endpoint,
                error = %e,
                "Failed to load remote configuration, continuing with local configuration"
            );
        }

        self
    }

    /// Fetch the remote document from `provider` and make it the top layer.
    ///
    /// # Errors
    ///
    /// Returns the provider's error; the configuration is left unchanged.
    pub async fn load_remote(&mut self, provider: &dyn RemoteProvider) -> Result<()> {
        let document = provider.fetch().await?;
        self.remote = Some(document);

        tracing::info!(
            provider = provider.name(),
            location = %provider.location(),
            application = %self.get_string(keys::APPLICATION).unwrap_or_default(),
            "Loaded configuration from remote provider"
        );
        Ok(())
    }

    /// Whether a remote document is in use.
    #[must_use]
    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Path of the configuration file, if one was loaded.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Whether `key` is set in any layer.
    #[must_use]
    pub fn is_set(&self, key: &str) -> bool {
        self.setting(key).is_some()
    }

    /// The value of `key` as a string. Numbers and booleans are formatted.
    #[must_use]
    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.setting(key)? {
            Setting::Env(s) => Some(s.to_string()),
            Setting::Json(Value::String(s)) => Some(s.clone()),
            Setting::Json(v) if v.is_number() || v.is_boolean() => Some(v.to_string()),
            Setting::Json(_) => None,
        }
    }

    /// The value of `key` as a non-empty string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingKey` if it is unset or empty.
    pub fn require_string(&self, key: &str) -> Result<String> {
        self.get_string(key)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
    }

    /// The value of `key` as an integer. Strings are parsed.
    #[must_use]
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.setting(key)? {
            Setting::Env(s) => s.trim().parse().ok(),
            Setting::Json(Value::Number(n)) => n.as_i64(),
            Setting::Json(Value::String(s)) => s.trim().parse().ok(),
            Setting::Json(_) => None,
        }
    }

    /// The value of `key` as a float. Strings are parsed.
    #[must_use]
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        match self.setting(key)? {
            Setting::Env(s) => s.trim().parse().ok(),
            Setting::Json(Value::Number(n)) => n.as_f64(),
            Setting::Json(Value::String(s)) => s.trim().parse().ok(),
            Setting::Json(_) => None,
        }
    }

    /// The value of `key` as a boolean. `true`/`false`/`1`/`0` strings are parsed.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.setting(key)? {
            Setting::Env(s) => parse_bool(s),
            Setting::Json(Value::Bool(b)) => Some(*b),
            Setting::Json(Value::String(s)) => parse_bool(s),
            Setting::Json(_) => None,
        }
    }

    /// The value of `key` as a nested map.
    #[must_use]
    pub fn get_map(&self, key: &str) -> Option<Map<String, Value>> {
        match self.setting(key)? {
            Setting::Json(Value::Object(map)) => Some(map.clone()),
            _ => None,
        }
    }

    /// The value of `key` as a list of strings. A string value is split on
    /// commas.
    #[must_use]
    pub fn get_string_list(&self, key: &str) -> Option<Vec<String>> {
        match self.setting(key)? {
            Setting::Json(Value::Array(items)) => Some(
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
            ),
            Setting::Json(Value::String(s)) => Some(split_list(s)),
            Setting::Env(s) => Some(split_list(s)),
            Setting::Json(_) => None,
        }
    }

    fn remote_settings(&self) -> Option<(String, String, String)> {
        let get = |key| self.get_string(key).filter(|s| !s.is_empty());
        Some((
            get(keys::REMOTE_PROVIDER)?,
            get(keys::REMOTE_ENDPOINT)?,
            get(keys::REMOTE_PATH)?,
        ))
    }

    fn setting(&self, key: &str) -> Option<Setting<'_>> {
        if let Some(value) = self.remote.as_ref().and_then(|doc| lookup(doc, key)) {
            return Some(Setting::Json(value));
        }
        if let Some(value) = self.env.get(&keys::env_var_name(key)) {
            return Some(Setting::Env(value));
        }
        lookup(&self.file, key).map(Setting::Json)
    }
}

/// `$HOME/.config`, the working directory, then `resources`.
#[must_use]
pub fn default_search_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::with_capacity(3);
    if let Some(home) = std::env::var_os("HOME") {
        dirs.push(PathBuf::from(home).join(".config"));
    }
    dirs.push(PathBuf::from("."));
    dirs.push(PathBuf::from("resources"));
    dirs
}

fn locate(name: &str, dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter().map(|dir| dir.join(name)).find(|p| p.is_file())
}

fn read_document(path: &Path) -> Result<Map<String, Value>> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let origin = path.display().to_string();
    match serde_json::from_str(&contents) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ConfigError::NotAnObject(origin)),
        Err(source) => Err(ConfigError::Parse { origin, source }),
    }
}

/// Follow a dotted key into nested objects. Null counts as unset.
fn lookup<'a>(doc: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    let mut segments = key.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    (!current.is_null()).then_some(current)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
