use crate::{BridgeError, CoreResult, RemoteControl};

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::oneshot;
use tracing::debug;

/// Identifier of one outstanding bind request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(pub u64);

/// The host's connection-oriented facility for reaching the control service.
///
/// `bind` only requests the connection; the outcome arrives later through the
/// supplied [`ConnectionCallbacks`]. Every successful `bind` is paired with
/// exactly one `unbind`.
pub trait ServiceBinder: Send + Sync {
    /// Request a connection. Fails synchronously when the service cannot be
    /// addressed at all.
    fn bind(&self, callbacks: ConnectionCallbacks) -> CoreResult<BindingId>;

    /// Release a connection or a still pending request. Never fails.
    fn unbind(&self, binding: BindingId);
}

type Connected = CoreResult<Arc<dyn RemoteControl>>;

/// Callbacks handed to [`ServiceBinder::bind`].
///
/// Only the first outcome counts; later calls are ignored.
#[derive(Clone)]
pub struct ConnectionCallbacks {
    slot: Arc<Mutex<Option<oneshot::Sender<Connected>>>>,
}

impl ConnectionCallbacks {
    pub(crate) fn pair() -> (Self, oneshot::Receiver<Connected>) {
        let (tx, rx) = oneshot::channel();
        let callbacks = Self {
            slot: Arc::new(Mutex::new(Some(tx))),
        };
        (callbacks, rx)
    }

    /// The service is connected and ready for calls.
    pub fn on_connected(&self, remote: Arc<dyn RemoteControl>) {
        self.complete(Ok(remote));
    }

    /// The connection object could not be unwrapped.
    #[track_caller]
    pub fn on_connect_failed(&self, reason: impl Into<String>) {
        self.complete(Err(BridgeError::connect_failure(reason)));
    }

    /// The service went away. Only meaningful before it ever connected.
    #[track_caller]
    pub fn on_disconnected(&self) {
        self.complete(Err(BridgeError::connect_failure("Service disconnected")));
    }

    fn complete(&self, outcome: Connected) {
        let sender = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match sender {
            Some(tx) => {
                if tx.send(outcome).is_err() {
                    debug!("Connection outcome arrived after the session gave up");
                }
            }
            None => debug!("Ignoring repeated connection callback"),
        }
    }
}
