//! Configuration for enlist.
//!
//! Configuration is read once at startup into an [`AppConfig`] and passed to
//! whatever needs it. Values come from three layers, highest first:
//!
//! 1. a remote JSON document (Consul KV), when `remote.*` is configured
//! 2. `ENLIST_*` environment variables
//! 3. the `appconfig.json` file
//!
//! Keys are dotted paths such as `smtp.host`; see [`keys`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod app;
pub mod error;
pub mod keys;
pub mod remote;

pub use app::{default_search_dirs, AppConfig};
pub use error::{ConfigError, Result};
pub use remote::{provider_for, ConsulProvider, RemoteProvider};
