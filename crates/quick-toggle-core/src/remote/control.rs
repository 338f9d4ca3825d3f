use crate::CoreResult;

use async_trait::async_trait;

/// Lightweight status path to the control service.
///
/// Independent of [`RemoteBindingSession`](crate::RemoteBindingSession).
/// Implementations report an unreachable service as
/// [`BridgeError::ConnectFailure`](crate::BridgeError::ConnectFailure) or
/// [`BridgeError::Timeout`](crate::BridgeError::Timeout); callers read that
/// as "not running".
#[async_trait]
pub trait StatusQuery: Send + Sync {
    /// Name of the loaded profile, `None` while the service is stopped.
    async fn current_profile_name(&self) -> CoreResult<Option<String>>;
}

/// Operations available on a connected control-service handle.
#[async_trait]
pub trait RemoteControl: Send + Sync {
    /// Packed cumulative traffic counter, see [`crate::traffic`].
    ///
    /// Fails when the remote process has died.
    async fn query_traffic_total(&self) -> CoreResult<Option<u64>>;
}

/// Starts and stops the tunneling service.
#[async_trait]
pub trait ServiceLauncher: Send + Sync {
    /// Start the service. Returns a request when the user must grant
    /// permission before the service can run.
    async fn start(&self) -> CoreResult<Option<PermissionRequest>>;

    /// Stop the service.
    async fn stop(&self) -> CoreResult<()>;
}

/// A permission grant the user has to confirm in the foreground.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRequest {
    /// What the user is asked to allow.
    pub description: String,
    /// Where the grant can be given, if the host can open it.
    pub target: Option<String>,
}
