use crate::{AppCommand, AppResult, TrayCommand, TrayHost, config::Config, tray_host::TRAY_INSTANCE};

use std::{sync::Arc, time::Duration};

use quick_toggle_core::{
    BridgeError, CompletionHandle, HostEvent, Scheduler, dispatch, finish_when_complete,
};
use tokio::sync::mpsc;
use tracing::{error, info, instrument, warn};
use tray_icon::menu::{MenuEvent, MenuId};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Wait up to `grace` for queued widget work to finish.
///
/// Work failures and the deadline both come back as [`crate::AppError::Core`].
pub(crate) async fn settle(
    handle: CompletionHandle,
    operation: &'static str,
    grace: Duration,
) -> AppResult<()> {
    tokio::time::timeout(grace, handle)
        .await
        .map_err(|_| BridgeError::timeout(operation, grace))??;
    Ok(())
}

/// Main application state.
///
/// Runs on the async runtime thread. Tray updates reach the main thread
/// through [`TrayHost`] because `TrayIcon` is `!Send` and must remain on the
/// UI thread.
pub struct App {
    pub(crate) scheduler: Scheduler,
    pub(crate) host: Arc<TrayHost>,
    pub(crate) config: Config,
    pub(crate) command_tx: mpsc::Sender<AppCommand>,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) toggle_menu_id: MenuId,
    pub(crate) open_menu_id: MenuId,
    pub(crate) exit_menu_id: MenuId,
}

impl App {
    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Quick Toggle starting");

        // MenuEvent::receiver() has a blocking recv(), so one blocking task
        // forwards menu clicks. It ends once tray_event_rx is dropped.
        let (tray_event_tx, mut tray_event_rx) = mpsc::channel(32);
        let tray_handle = tokio::task::spawn_blocking(move || {
            let receiver = MenuEvent::receiver();
            while let Ok(event) = receiver.recv() {
                if tray_event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        self.forward(HostEvent::InstanceEnabled);

        loop {
            tokio::select! {
                Some(event) = tray_event_rx.recv() => {
                    self.handle_tray_event(event).await;
                }

                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        AppCommand::Host(event) => self.forward(event),
                        AppCommand::OpenDashboard => self.open_dashboard(),
                        AppCommand::Shutdown => {
                            info!("Shutdown requested");
                            break;
                        }
                    }
                }

                else => {
                    info!("All channels closed, shutting down");
                    break;
                }
            }
        }

        drop(tray_event_rx);

        match tokio::time::timeout(SHUTDOWN_GRACE, tray_handle).await {
            Ok(Ok(())) => info!("Tray event forwarder stopped cleanly"),
            Ok(Err(e)) => error!(error = ?e, "Tray event forwarder task panicked"),
            Err(_) => info!(
                "Tray event forwarder did not stop within timeout, \
                     will be cleaned up on exit"
            ),
        }

        self.shutdown().await;
        info!("Quick Toggle shut down successfully");

        Ok(())
    }

    /// Hand a host event to the scheduler and log its outcome when done.
    #[instrument(skip(self))]
    fn forward(&self, event: HostEvent) {
        let label = format!("{:?}", event);
        let handle = dispatch(&self.scheduler, event);

        finish_when_complete(&self.scheduler, handle, move |outcome| match outcome {
            Ok(()) => info!(event = %label, "Widget work finished"),
            Err(e) if e.is_cancelled() || e.is_queue_closed() => {
                warn!(event = %label, error = ?e, "Widget work dropped")
            }
            Err(e) => error!(event = %label, error = ?e, "Widget work failed"),
        });
    }

    fn open_dashboard(&self) {
        let url = &self.config.service.dashboard_url;
        match open::that(url) {
            Ok(()) => info!(url = %url, "Opened dashboard"),
            Err(e) => error!(url = %url, error = ?e, "Failed to open dashboard"),
        }
    }

    /// Remove the tray placement, let the scheduler settle, then close the UI.
    #[instrument(skip(self))]
    async fn shutdown(&self) {
        self.host.detach();

        let disabled = dispatch(&self.scheduler, HostEvent::InstanceDisabled);
        match settle(disabled, "instance_disabled", SHUTDOWN_GRACE).await {
            Ok(()) => info!("Periodic refresh stopped for exit"),
            Err(e) => warn!(error = ?e, "Final widget update did not settle"),
        }

        self.scheduler.shutdown();

        if !self.host.send(TrayCommand::Shutdown) {
            warn!("Tray event loop already closed");
        }
    }

    /// Handle tray menu events.
    #[instrument(skip(self))]
    async fn handle_tray_event(&mut self, event: MenuEvent) {
        let event_id = &event.id;

        let command = if *event_id == self.toggle_menu_id {
            AppCommand::Host(HostEvent::UserTap {
                instance: TRAY_INSTANCE,
            })
        } else if *event_id == self.open_menu_id {
            AppCommand::OpenDashboard
        } else if *event_id == self.exit_menu_id {
            info!("Exit requested from tray menu");
            AppCommand::Shutdown
        } else {
            return;
        };

        if let Err(e) = self.command_tx.send(command).await {
            error!(error = ?e, "Failed to send app command");
        }
    }
}
