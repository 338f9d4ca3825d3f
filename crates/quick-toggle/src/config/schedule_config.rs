use crate::config::{
    default_bind_timeout_ms, default_refresh_interval_ms, default_toggle_grace_ms,
};

use serde::{Deserialize, Serialize};

/// Timing of the widget scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Pause between periodic refreshes, in milliseconds.
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,

    /// Deadline for connecting to and calling the control service.
    #[serde(default = "default_bind_timeout_ms")]
    pub bind_timeout_ms: u64,

    /// Pause after a start/stop before the widget is redrawn.
    #[serde(default = "default_toggle_grace_ms")]
    pub toggle_grace_ms: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: default_refresh_interval_ms(),
            bind_timeout_ms: default_bind_timeout_ms(),
            toggle_grace_ms: default_toggle_grace_ms(),
        }
    }
}
