use crate::TrayCommand;

use quick_toggle_core::{
    BridgeError, CoreResult, InstanceId, PermissionRequest, RenderCommand, SurfaceHost,
};

use std::{
    collections::BTreeSet,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use notify_rust::Notification;
use tao::event_loop::EventLoopProxy;
use tracing::{debug, error, info, instrument, warn};

/// The desktop tray is the one and only placement.
pub(crate) const TRAY_INSTANCE: InstanceId = InstanceId(1);

/// Surface host backed by the tray on the main thread.
///
/// Render commands are posted to the UI thread through the event loop proxy;
/// `TrayIcon` never leaves that thread.
pub struct TrayHost {
    proxy: Mutex<EventLoopProxy<TrayCommand>>,
    attached: AtomicBool,
}

impl TrayHost {
    /// Attach to the tray behind `proxy`.
    pub fn new(proxy: EventLoopProxy<TrayCommand>) -> Self {
        Self {
            proxy: Mutex::new(proxy),
            attached: AtomicBool::new(true),
        }
    }

    /// Remove the tray placement. Later refreshes see no instances.
    pub fn detach(&self) {
        self.attached.store(false, Ordering::Release);
        info!("Tray placement removed");
    }

    /// Post a command to the UI thread.
    pub fn send(&self, command: TrayCommand) -> bool {
        self.proxy
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .send_event(command)
            .is_ok()
    }
}

#[async_trait]
impl SurfaceHost for TrayHost {
    fn registered_instance_ids(&self) -> BTreeSet<InstanceId> {
        if self.attached.load(Ordering::Acquire) {
            BTreeSet::from([TRAY_INSTANCE])
        } else {
            BTreeSet::new()
        }
    }

    #[instrument(skip(self, command), fields(instance = command.instance.0))]
    async fn issue_render_command(&self, command: RenderCommand) -> CoreResult<()> {
        if command.instance != TRAY_INSTANCE {
            warn!("Render for unknown instance ignored");
            return Ok(());
        }

        if !self.send(TrayCommand::Render(command)) {
            return Err(BridgeError::render_failed("Tray event loop is gone"));
        }

        debug!("Render posted to tray");
        Ok(())
    }

    #[instrument(skip(self))]
    fn request_permission(&self, request: PermissionRequest) {
        if let Err(e) = Notification::new()
            .summary("Quick Toggle")
            .body(&request.description)
            .show()
        {
            error!(error = ?e, "Failed to show permission notification");
        }

        if let Some(target) = &request.target {
            match open::that(target) {
                Ok(()) => info!(target = %target, "Opened permission target"),
                Err(e) => error!(target = %target, error = ?e, "Failed to open permission target"),
            }
        }
    }
}
