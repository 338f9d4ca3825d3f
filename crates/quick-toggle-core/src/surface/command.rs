use crate::{DisplaySnapshot, InstanceId, Labels};

/// Visual tone of a rendered surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Service running.
    Active,
    /// Service stopped.
    Inactive,
    /// Fallback presentation.
    Error,
}

/// Click target attached to part of the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickAction {
    /// Toggle the service, tagged with the instance that was tapped.
    Toggle {
        /// Instance the tap came from.
        instance: InstanceId,
    },
    /// Bring the main application to the foreground.
    OpenApp,
}

/// Whole-surface replacement for one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderCommand {
    /// Target instance.
    pub instance: InstanceId,
    /// Tone for background, icon tint and status colour.
    pub tone: Tone,
    /// Status line.
    pub status_text: String,
    /// Caption next to the upload value.
    pub upload_caption: String,
    /// Upload value.
    pub upload_text: String,
    /// Caption next to the download value.
    pub download_caption: String,
    /// Download value.
    pub download_text: String,
    /// Accessible description of the toggle button.
    pub toggle_description: String,
    /// Action behind the toggle button.
    pub toggle_action: ClickAction,
    /// Action behind the rest of the surface.
    pub open_action: ClickAction,
}

/// Build the render command for `instance`. Pure.
pub fn build_command(instance: InstanceId, snapshot: &DisplaySnapshot, labels: &Labels) -> RenderCommand {
    let tone = if snapshot.is_error {
        Tone::Error
    } else if snapshot.running {
        Tone::Active
    } else {
        Tone::Inactive
    };

    let toggle_description = if snapshot.running {
        labels.action_stop.clone()
    } else {
        labels.action_start.clone()
    };

    RenderCommand {
        instance,
        tone,
        status_text: snapshot.status_text.clone(),
        upload_caption: labels.upload_caption.clone(),
        upload_text: snapshot.upload_text.clone(),
        download_caption: labels.download_caption.clone(),
        download_text: snapshot.download_text.clone(),
        toggle_description,
        toggle_action: ClickAction::Toggle { instance },
        open_action: ClickAction::OpenApp,
    }
}
