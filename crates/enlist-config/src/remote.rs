//! Remote configuration providers.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value};

use crate::error::{ConfigError, Result};

/// Timeout for a remote configuration fetch.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// A source of a configuration document held outside the process.
#[async_trait]
pub trait RemoteProvider: Send + Sync {
    /// Provider name, for logging.
    fn name(&self) -> &str;

    /// Where the document is fetched from, for logging.
    fn location(&self) -> String;

    /// Fetch the configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be reached or the document is
    /// not a JSON object.
    async fn fetch(&self) -> Result<Map<String, Value>>;
}

/// Build the provider named `provider`.
///
/// # Errors
///
/// Returns `ConfigError::UnsupportedProvider` for anything but `consul`, or
/// `ConfigError::Remote` if the HTTP client cannot be built.
pub fn provider_for(provider: &str, endpoint: &str, path: &str) -> Result<Box<dyn RemoteProvider>> {
    match provider.to_ascii_lowercase().as_str() {
        "consul" => Ok(Box::new(ConsulProvider::new(endpoint, path)?)),
        other => Err(ConfigError::UnsupportedProvider(other.to_string())),
    }
}

/// Reads a JSON document from the Consul KV store.
#[derive(Debug, Clone)]
pub struct ConsulProvider {
    client: Client,
    endpoint: String,
    path: String,
}

impl ConsulProvider {
    /// Create a provider for the key `path` on the agent at `endpoint`.
    ///
    /// An endpoint without a scheme is taken to be plain HTTP, so
    /// `localhost:8500` works.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Remote` if the HTTP client cannot be built.
    pub fn new(endpoint: &str, path: &str) -> Result<Self> {
        let client = Client::builder().timeout(FETCH_TIMEOUT).build()?;

        let endpoint = endpoint.trim_end_matches('/');
        let endpoint = if endpoint.contains("://") {
            endpoint.to_string()
        } else {
            format!("http://{endpoint}")
        };

        Ok(Self {
            client,
            endpoint,
            path: path.trim_matches('/').to_string(),
        })
    }

    fn url(&self) -> String {
        format!("{}/v1/kv/{}", self.endpoint, self.path)
    }
}

#[async_trait]
impl RemoteProvider for ConsulProvider {
    fn name(&self) -> &str {
        "consul"
    }

    fn location(&self) -> String {
        self.url()
    }

    async fn fetch(&self) -> Result<Map<String, Value>> {
        let url = self.url();
        tracing::debug!(url = %url, "Fetching remote configuration");

        let response = self.client.get(format!("{url}?raw")).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConfigError::RemoteStatus {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let document: Value = serde_json::from_slice(&body).map_err(|source| ConfigError::Parse {
            origin: url.clone(),
            source,
        })?;

        match document {
            Value::Object(map) => Ok(map),
            _ => Err(ConfigError::NotAnObject(url)),
        }
    }
}
