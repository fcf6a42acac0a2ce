//! Logging setup.
//!
//! The subscriber is installed before configuration is read so that loading
//! it is logged; `log.level` is applied afterwards through a reload handle.

use tracing_subscriber::{
    fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

use enlist_config::{keys, AppConfig};

/// Log filter used when neither `RUST_LOG` nor `log.level` is set.
pub const DEFAULT_LOG_FILTER: &str = "info,enlist=debug";

/// Handle for replacing the active log filter.
pub type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Install the global subscriber, filtered by `RUST_LOG` or the default.
#[must_use]
pub fn init() -> FilterHandle {
    let initial = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let (filter, handle) = reload::Layer::new(initial);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    handle
}

/// Apply `log.level` from `config`, unless `RUST_LOG` already chose a filter.
pub fn apply_config_level(handle: &FilterHandle, config: &AppConfig) {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return;
    }
    if let Some(level) = config.get_string(keys::LOG_LEVEL) {
        set_level(handle, &level);
    }
}

/// Replace the active filter with `directives`. Invalid directives are
/// logged and the current filter is kept.
pub fn set_level(handle: &FilterHandle, directives: &str) {
    match EnvFilter::try_new(directives) {
        Ok(filter) => {
            if let Err(e) = handle.reload(filter) {
                tracing::warn!(error = %e, "Failed to apply log level");
            }
        }
        Err(e) => tracing::warn!(level = directives, error = %e, "Ignoring invalid log.level"),
    }
}
