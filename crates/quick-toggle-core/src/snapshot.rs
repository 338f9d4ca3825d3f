use serde::{Deserialize, Serialize};

/// Opaque identifier the host issues for one placement of the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub i32);

/// What a surface should show. Built fresh for every refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySnapshot {
    /// Whether the tunneling service is running.
    pub running: bool,
    /// Profile name or one of the generic status labels.
    pub status_text: String,
    /// Formatted cumulative upload, or the placeholder.
    pub upload_text: String,
    /// Formatted cumulative download, or the placeholder.
    pub download_text: String,
    /// Set only on the fallback snapshot.
    pub is_error: bool,
}

impl DisplaySnapshot {
    /// The fixed snapshot shown when real state cannot be determined.
    pub fn fallback(labels: &Labels) -> Self {
        Self {
            running: false,
            status_text: labels.status_error.clone(),
            upload_text: labels.placeholder.clone(),
            download_text: labels.placeholder.clone(),
            is_error: true,
        }
    }
}

/// User-visible strings used by the loader and the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    /// Status when running without a usable profile name.
    #[serde(default = "default_status_active")]
    pub status_active: String,
    /// Status when the service is stopped.
    #[serde(default = "default_status_inactive")]
    pub status_inactive: String,
    /// Status on the fallback snapshot.
    #[serde(default = "default_status_error")]
    pub status_error: String,
    /// Traffic text when counters are unavailable.
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
    /// Caption next to the upload value.
    #[serde(default = "default_upload_caption")]
    pub upload_caption: String,
    /// Caption next to the download value.
    #[serde(default = "default_download_caption")]
    pub download_caption: String,
    /// Toggle description while stopped.
    #[serde(default = "default_action_start")]
    pub action_start: String,
    /// Toggle description while running.
    #[serde(default = "default_action_stop")]
    pub action_stop: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            status_active: default_status_active(),
            status_inactive: default_status_inactive(),
            status_error: default_status_error(),
            placeholder: default_placeholder(),
            upload_caption: default_upload_caption(),
            download_caption: default_download_caption(),
            action_start: default_action_start(),
            action_stop: default_action_stop(),
        }
    }
}

fn default_status_active() -> String {
    "Running".to_string()
}

fn default_status_inactive() -> String {
    "Stopped".to_string()
}

fn default_status_error() -> String {
    "Unavailable".to_string()
}

fn default_placeholder() -> String {
    "--".to_string()
}

fn default_upload_caption() -> String {
    "Upload".to_string()
}

fn default_download_caption() -> String {
    "Download".to_string()
}

fn default_action_start() -> String {
    "Start".to_string()
}

fn default_action_stop() -> String {
    "Stop".to_string()
}
