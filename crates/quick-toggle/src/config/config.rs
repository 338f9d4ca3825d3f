//! Configuration management for quick-toggle.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths, validation, and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{ScheduleConfig, ServiceConfig},
};

use std::{fs, io::Write, path::PathBuf, time::Duration};

use directories::ProjectDirs;
use quick_toggle_core::{Labels, SchedulerConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Main configuration struct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Scheduler timing.
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// Control service connection.
    #[serde(default)]
    pub service: ServiceConfig,
    /// Strings shown on the widget.
    #[serde(default)]
    pub labels: Labels,
}

impl Config {
    /// Load configuration from disk, creating default if not found.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = fs::read_to_string(&config_path)
                .map_err(|e| AppError::config(format!("Failed to read config: {}", e)))?;

            let config = Self::from_toml(&contents)?;
            config.validate()?;

            info!(config_path = ?config_path, "Configuration loaded");

            Ok(config)
        } else {
            info!("No config found, creating default");
            Self::create_default()
        }
    }

    /// Parse a TOML document. Missing sections and keys take their defaults.
    #[track_caller]
    pub fn from_toml(contents: &str) -> AppResult<Self> {
        toml::from_str(contents)
            .map_err(|e| AppError::config(format!("Failed to parse config: {}", e)))
    }

    /// Reject settings the scheduler cannot run with.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn validate(&self) -> AppResult<()> {
        let durations = [
            ("schedule.refresh_interval_ms", self.schedule.refresh_interval_ms),
            ("schedule.bind_timeout_ms", self.schedule.bind_timeout_ms),
            ("schedule.toggle_grace_ms", self.schedule.toggle_grace_ms),
            ("service.request_timeout_ms", self.service.request_timeout_ms),
        ];

        if let Some((key, _)) = durations.iter().find(|(_, ms)| *ms == 0) {
            return Err(AppError::config(format!("{} must be greater than zero", key)));
        }

        if self.service.control_addr.trim().is_empty() {
            return Err(AppError::config("service.control_addr must not be empty"));
        }

        Ok(())
    }

    /// Save configuration to disk using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    #[instrument]
    pub fn save(&self) -> AppResult<()> {
        let config_path = Self::config_path()?;

        let contents = toml::to_string_pretty(self)
            .map_err(|e| AppError::config(format!("Failed to serialize config: {}", e)))?;

        let temp_path = config_path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path)
            .map_err(|e| AppError::config(format!("Failed to create temp config file: {}", e)))?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::config(format!("Failed to write temp config file: {}", e)))?;

        temp_file
            .sync_all()
            .map_err(|e| AppError::config(format!("Failed to sync temp config file: {}", e)))?;

        fs::rename(&temp_path, &config_path).map_err(|e| {
            AppError::config(format!("Failed to rename temp config to final: {}", e))
        })?;

        info!(config_path = ?config_path, "Configuration saved (atomic write)");

        Ok(())
    }

    /// Scheduler settings derived from `[schedule]` and `[labels]`.
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            refresh_interval: Duration::from_millis(self.schedule.refresh_interval_ms),
            bind_timeout: Duration::from_millis(self.schedule.bind_timeout_ms),
            toggle_grace: Duration::from_millis(self.schedule.toggle_grace_ms),
            labels: self.labels.clone(),
        }
    }

    /// Deadline for one control-service request.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.service.request_timeout_ms)
    }

    #[track_caller]
    fn config_path() -> AppResult<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "quick-toggle", "Quick-Toggle")
            .ok_or_else(|| AppError::config("Failed to get config directory"))?;

        let config_dir = proj_dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        Ok(config_dir.join("config.toml"))
    }

    #[track_caller]
    fn create_default() -> AppResult<Self> {
        let config = Config::default();
        config.save()?;

        info!(
            control_addr = %config.service.control_addr,
            "Default config created"
        );

        Ok(config)
    }
}
