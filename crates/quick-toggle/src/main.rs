//! Quick Toggle: desktop tray widget for a tunneling service's status,
//! traffic and on/off switch.

mod app;
mod app_command;
mod config;
mod control_client;
mod error;
#[cfg(test)]
mod tests;
mod tray_command;
mod tray_host;
mod tray_manager;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    control_client::{ControlClient, TcpBinder},
    error::{AppError, Result as AppResult},
    tray_command::TrayCommand,
    tray_host::TrayHost,
    tray_manager::TrayManager,
};

use crate::config::Config;

use std::sync::Arc;

use quick_toggle_core::{Collaborators, Scheduler};
use tao::{
    event::Event,
    event_loop::{ControlFlow, EventLoopBuilder},
};
use tokio::{runtime::Handle, sync::mpsc};
use tracing::error;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "quick_toggle=debug,quick_toggle_core=debug";

/// Application entry point.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let event_loop = EventLoopBuilder::<TrayCommand>::with_user_event().build();
    let tray_proxy = event_loop.create_proxy();

    // TrayManager lives on the main thread - TrayIcon is !Send on all platforms.
    let mut tray_manager = match TrayManager::new() {
        Ok(tm) => tm,
        Err(e) => {
            error!("Failed to create TrayManager: {:?}", e);
            std::process::exit(1);
        }
    };

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::UserEvent(cmd) => match cmd {
                TrayCommand::Render(command) => {
                    if let Err(e) = tray_manager.apply(&command) {
                        error!(error = ?e, "Failed to update tray icon");
                    }
                }
                TrayCommand::Shutdown => {
                    *control_flow = ControlFlow::ExitWithCode(0);
                }
            },
            Event::NewEvents(tao::event::StartCause::Init) => {
                let config = match Config::load() {
                    Ok(c) => c,
                    Err(e) => {
                        error!("Failed to load config: {:?}", e);
                        std::process::exit(1);
                    }
                };

                #[cfg(target_os = "macos")]
                unsafe {
                    use core_foundation::runloop::{CFRunLoopGetMain, CFRunLoopWakeUp};
                    CFRunLoopWakeUp(CFRunLoopGetMain());
                }

                let tray_proxy = tray_proxy.clone();
                let toggle_menu_id = tray_manager.toggle_item_id().clone();
                let open_menu_id = tray_manager.open_item_id().clone();
                let exit_menu_id = tray_manager.exit_item_id().clone();

                // Spawn tokio runtime on separate thread.
                // TrayManager stays on the main thread.
                std::thread::spawn(move || {
                    let rt = match tokio::runtime::Runtime::new() {
                        Ok(rt) => rt,
                        Err(e) => {
                            error!("Failed to create tokio runtime: {:?}", e);
                            std::process::exit(1);
                        }
                    };

                    rt.block_on(async {
                        let runtime = Handle::current();
                        let client = Arc::new(ControlClient::new(
                            config.service.control_addr.clone(),
                            config.request_timeout(),
                        ));
                        let host = Arc::new(TrayHost::new(tray_proxy));

                        let collaborators = Collaborators {
                            host: host.clone(),
                            status: client.clone(),
                            binder: Arc::new(TcpBinder::new(
                                config.service.control_addr.clone(),
                                runtime.clone(),
                            )),
                            launcher: client,
                        };

                        let scheduler =
                            Scheduler::new(collaborators, config.scheduler_config(), runtime);
                        let (command_tx, command_rx) = mpsc::channel(32);

                        let app = App {
                            scheduler,
                            host,
                            config,
                            command_tx,
                            command_rx,
                            toggle_menu_id,
                            open_menu_id,
                            exit_menu_id,
                        };

                        if let Err(e) = app.run().await {
                            error!(error = ?e, "App error");
                        }
                    });
                });
            }
            _ => {}
        }
    });
}
