#[allow(clippy::module_inception)]
mod config;
mod host_config;
mod logging_config;
mod storage_config;

pub(crate) use {
    config::Config, host_config::HostConfig, logging_config::LoggingConfig,
    storage_config::StorageConfig,
};

use tab_volume_core::host::{DEFAULT_HOST_NAME, DEFAULT_INITIAL_BACKOFF, DEFAULT_MAX_BACKOFF};

pub(crate) const DEFAULT_INITIAL_BACKOFF_MS: u64 = DEFAULT_INITIAL_BACKOFF.as_millis() as u64;
pub(crate) const DEFAULT_MAX_BACKOFF_MS: u64 = DEFAULT_MAX_BACKOFF.as_millis() as u64;
pub(crate) const DEFAULT_BROADCAST_TABS: bool = false;
pub(crate) const DEFAULT_LOG_FILTER: &str = "tab_volume=debug,tab_volume_core=debug";
pub(crate) const PREFERENCES_FILE_NAME: &str = "preferences.json";

pub(crate) fn default_host_name() -> String {
    DEFAULT_HOST_NAME.to_string()
}

pub(crate) fn default_initial_backoff_ms() -> u64 {
    DEFAULT_INITIAL_BACKOFF_MS
}

pub(crate) fn default_max_backoff_ms() -> u64 {
    DEFAULT_MAX_BACKOFF_MS
}

pub(crate) fn default_broadcast_tabs() -> bool {
    DEFAULT_BROADCAST_TABS
}

pub(crate) fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}
