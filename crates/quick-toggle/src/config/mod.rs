#[allow(clippy::module_inception)]
mod config;
mod schedule_config;
mod service_config;

pub(crate) use {config::Config, schedule_config::ScheduleConfig, service_config::ServiceConfig};

pub(crate) const DEFAULT_REFRESH_INTERVAL_MS: u64 = 8_000;
pub(crate) const DEFAULT_BIND_TIMEOUT_MS: u64 = 2_000;
pub(crate) const DEFAULT_TOGGLE_GRACE_MS: u64 = 500;
pub(crate) const DEFAULT_CONTROL_ADDR: &str = "127.0.0.1:9790";
pub(crate) const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 2_000;
pub(crate) const DEFAULT_DASHBOARD_URL: &str = "http://127.0.0.1:9790/";

pub(crate) fn default_refresh_interval_ms() -> u64 {
    DEFAULT_REFRESH_INTERVAL_MS
}

pub(crate) fn default_bind_timeout_ms() -> u64 {
    DEFAULT_BIND_TIMEOUT_MS
}

pub(crate) fn default_toggle_grace_ms() -> u64 {
    DEFAULT_TOGGLE_GRACE_MS
}

pub(crate) fn default_control_addr() -> String {
    DEFAULT_CONTROL_ADDR.to_string()
}

pub(crate) fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

pub(crate) fn default_dashboard_url() -> String {
    DEFAULT_DASHBOARD_URL.to_string()
}
