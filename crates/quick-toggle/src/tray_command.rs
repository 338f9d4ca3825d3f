use quick_toggle_core::RenderCommand;

/// Commands sent from the async runtime to the main UI thread.
///
/// The main thread owns `TrayManager` (because `TrayIcon` is `!Send`),
/// so all tray mutations and process lifecycle events flow through this enum.
#[derive(Debug, Clone)]
pub enum TrayCommand {
    /// Redraw the tray from a render command.
    Render(RenderCommand),
    /// Shut down the application. The main thread will exit the event loop.
    Shutdown,
}
