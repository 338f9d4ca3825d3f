//! One connect → call → release cycle against the control service.
//!
//! The connection request is paired with a [`BindingGuard`] as soon as it is
//! issued, so the binding is released on every exit path: success, failure,
//! timeout, and the calling task being cancelled mid-await.

use crate::{BindingId, BridgeError, ConnectionCallbacks, CoreResult, RemoteControl, ServiceBinder};

use std::{future::Future, sync::Arc, time::Duration};

use tracing::{debug, instrument, warn};

/// Default deadline for connecting and for the single operation.
pub const DEFAULT_BIND_TIMEOUT: Duration = Duration::from_millis(2_000);

/// Lifecycle of a [`RemoteBindingSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, nothing requested yet.
    Idle,
    /// Bind requested, waiting for the connected callback.
    Connecting,
    /// Connected, the operation is running.
    Ready,
    /// Released. Terminal.
    Closed,
}

/// A single-use connection to the control service.
pub struct RemoteBindingSession {
    binder: Arc<dyn ServiceBinder>,
    deadline: Duration,
    state: SessionState,
}

impl RemoteBindingSession {
    /// Create an idle session. Both the connect wait and the operation are
    /// bounded by `deadline`.
    pub fn new(binder: Arc<dyn ServiceBinder>, deadline: Duration) -> Self {
        Self {
            binder,
            deadline,
            state: SessionState::Idle,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Connect, run `call` once against the connected handle, release.
    ///
    /// # Errors
    ///
    /// - `ConnectFailure` if the bind is refused, the connection cannot be
    ///   unwrapped, or the session was already used.
    /// - `Timeout` if connecting or the call exceeds the deadline.
    /// - `OperationFailure` wrapping whatever the call returned as an error.
    #[instrument(skip(self, call), fields(deadline_ms = self.deadline.as_millis() as u64))]
    pub async fn with_session<T, F, Fut>(&mut self, operation: &'static str, call: F) -> CoreResult<T>
    where
        F: FnOnce(Arc<dyn RemoteControl>) -> Fut,
        Fut: Future<Output = CoreResult<T>>,
    {
        if self.state != SessionState::Idle {
            return Err(BridgeError::connect_failure(format!(
                "Session already used (state {:?})",
                self.state
            )));
        }

        let result = self.run(operation, call).await;
        self.transition_to(SessionState::Closed);
        result
    }

    async fn run<T, F, Fut>(&mut self, operation: &'static str, call: F) -> CoreResult<T>
    where
        F: FnOnce(Arc<dyn RemoteControl>) -> Fut,
        Fut: Future<Output = CoreResult<T>>,
    {
        let (callbacks, connected) = ConnectionCallbacks::pair();

        self.transition_to(SessionState::Connecting);
        let binding = match self.binder.bind(callbacks) {
            Ok(binding) => binding,
            Err(e @ BridgeError::ConnectFailure { .. }) => {
                warn!(error = ?e, "Unable to bind control service");
                return Err(e);
            }
            Err(e) => {
                warn!(error = ?e, "Unable to bind control service");
                return Err(BridgeError::connect_failure(e.to_string()));
            }
        };
        let _guard = BindingGuard::new(Arc::clone(&self.binder), binding);

        let remote = match tokio::time::timeout(self.deadline, connected).await {
            Ok(Ok(Ok(remote))) => remote,
            Ok(Ok(Err(e))) => {
                warn!(error = ?e, "Control service connection failed");
                return Err(e);
            }
            Ok(Err(_)) => {
                warn!("Binder dropped the connection callbacks");
                return Err(BridgeError::connect_failure(
                    "Connection callbacks dropped before connecting",
                ));
            }
            Err(_) => {
                warn!("Control service connection timed out");
                return Err(BridgeError::timeout("connect", self.deadline));
            }
        };

        self.transition_to(SessionState::Ready);

        match tokio::time::timeout(self.deadline, call(remote)).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!(operation, error = ?e, "Remote operation failed");
                Err(BridgeError::operation_failure(operation, e))
            }
            Err(_) => {
                warn!(operation, "Remote operation timed out");
                Err(BridgeError::timeout(operation, self.deadline))
            }
        }
    }

    fn transition_to(&mut self, next: SessionState) {
        debug!(from = ?self.state, to = ?next, "Binding session transition");
        self.state = next;
    }
}

/// RAII guard that releases a binding when dropped.
///
/// Dropping happens on normal return, on `?`, and when the owning future is
/// cancelled, so there is no path that leaves the binding held.
struct BindingGuard {
    binder: Arc<dyn ServiceBinder>,
    binding: BindingId,
}

impl BindingGuard {
    fn new(binder: Arc<dyn ServiceBinder>, binding: BindingId) -> Self {
        Self { binder, binding }
    }
}

impl Drop for BindingGuard {
    fn drop(&mut self) {
        self.binder.unbind(self.binding);
        debug!(binding = ?self.binding, "Binding released");
    }
}
