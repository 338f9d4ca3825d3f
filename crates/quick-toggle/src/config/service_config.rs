use crate::config::{default_control_addr, default_dashboard_url, default_request_timeout_ms};

use serde::{Deserialize, Serialize};

/// Where and how to reach the control service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// `host:port` of the control service's line protocol.
    #[serde(default = "default_control_addr")]
    pub control_addr: String,

    /// Deadline for one status or start/stop request, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Page opened by the "Open dashboard" menu entry.
    #[serde(default = "default_dashboard_url")]
    pub dashboard_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            control_addr: default_control_addr(),
            request_timeout_ms: default_request_timeout_ms(),
            dashboard_url: default_dashboard_url(),
        }
    }
}
