//! Quick Toggle Core Library
//!
//! Serialized work scheduler behind a persistent status widget for a
//! tunneling service. Refresh and toggle requests from any number of callers
//! go through one queue and one worker; each request gets a
//! [`CompletionHandle`] that resolves when its work is done.
//!
//! # Example
//!
//! ```no_run
//! use quick_toggle_core::{HostEvent, InstanceId, Scheduler, dispatch};
//!
//! async fn on_tap(scheduler: &Scheduler) {
//!     let handle = dispatch(scheduler, HostEvent::UserTap { instance: InstanceId(1) });
//!
//!     if let Err(e) = handle.await {
//!         eprintln!("Toggle did not take effect: {e}");
//!     }
//! }
//! ```

mod error;
mod loader;
mod remote;
mod scheduler;
mod snapshot;
mod surface;
pub mod traffic;

pub use {
    error::{BoxedCause, BridgeError, Result as CoreResult},
    loader::StateLoader,
    remote::{
        BindingId, ConnectionCallbacks, DEFAULT_BIND_TIMEOUT, PermissionRequest,
        RemoteBindingSession, RemoteControl, ServiceBinder, ServiceLauncher, SessionState,
        StatusQuery,
    },
    scheduler::{
        Collaborators, Completion, CompletionHandle, DEFAULT_REFRESH_INTERVAL,
        DEFAULT_TOGGLE_GRACE, HostEvent, QueueState, Scheduler, SchedulerConfig, WidgetWork,
        WorkDrain, WorkOutcome, WorkReceiver, WorkSender, dispatch, finish_when_complete,
    },
    snapshot::{DisplaySnapshot, InstanceId, Labels},
    surface::{
        ClickAction, RenderCommand, RenderOutcome, SurfaceHost, SurfaceRenderer, Tone,
        build_command,
    },
};

#[cfg(test)]
mod tests;
