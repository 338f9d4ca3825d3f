mod binding;
mod control;
mod session;

pub use {
    binding::{BindingId, ConnectionCallbacks, ServiceBinder},
    control::{PermissionRequest, RemoteControl, ServiceLauncher, StatusQuery},
    session::{DEFAULT_BIND_TIMEOUT, RemoteBindingSession, SessionState},
};
