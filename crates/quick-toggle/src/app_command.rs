use quick_toggle_core::HostEvent;

/// Commands handled by the application loop.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Forward a host notification to the scheduler.
    Host(HostEvent),
    /// Open the service dashboard in the browser.
    OpenDashboard,
    /// Request application shutdown.
    Shutdown,
}
