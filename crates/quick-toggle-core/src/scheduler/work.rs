use crate::{BridgeError, CoreResult, InstanceId};

use std::{
    collections::BTreeSet,
    future::Future,
    panic::Location,
    pin::Pin,
    task::{Context, Poll},
};

use error_location::ErrorLocation;
use tokio::sync::oneshot;
use tracing::debug;
use uuid::Uuid;

/// Final result of one work item.
pub type WorkOutcome = CoreResult<()>;

/// A unit of work for the widget worker.
#[derive(Debug)]
pub enum WidgetWork {
    /// Reload state and redraw.
    Update {
        /// Instances to redraw; `None` means every registered instance.
        ids: Option<BTreeSet<InstanceId>>,
        /// Resolved once the redraw is done.
        completion: Completion,
    },
    /// Start or stop the service, then redraw everything.
    Toggle {
        /// Resolved once the toggle and its redraw are done.
        completion: Completion,
    },
}

impl WidgetWork {
    /// Create an update item and the handle its caller awaits.
    pub fn update(ids: Option<BTreeSet<InstanceId>>) -> (Self, CompletionHandle) {
        let (completion, handle) = Completion::pair();
        (WidgetWork::Update { ids, completion }, handle)
    }

    /// Create a toggle item and the handle its caller awaits.
    pub fn toggle() -> (Self, CompletionHandle) {
        let (completion, handle) = Completion::pair();
        (WidgetWork::Toggle { completion }, handle)
    }

    /// Correlation id shared with the caller's handle.
    pub fn id(&self) -> Uuid {
        match self {
            WidgetWork::Update { completion, .. } | WidgetWork::Toggle { completion } => {
                completion.work_id
            }
        }
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            WidgetWork::Update { .. } => "update",
            WidgetWork::Toggle { .. } => "toggle",
        }
    }

    /// Give up on this item, resolving its completion with `outcome`.
    pub(crate) fn abandon(self, outcome: WorkOutcome) {
        match self {
            WidgetWork::Update { completion, .. } | WidgetWork::Toggle { completion } => {
                completion.resolve(outcome)
            }
        }
    }
}

/// Write-once result slot carried by a [`WidgetWork`].
///
/// Dropping it unresolved resolves the caller with [`BridgeError::Cancelled`],
/// so a worker torn down mid-item still answers every waiter.
#[derive(Debug)]
pub struct Completion {
    work_id: Uuid,
    tx: Option<oneshot::Sender<WorkOutcome>>,
}

impl Completion {
    fn pair() -> (Self, CompletionHandle) {
        let work_id = Uuid::new_v4();
        let (tx, rx) = oneshot::channel();
        (
            Self {
                work_id,
                tx: Some(tx),
            },
            CompletionHandle { work_id, rx },
        )
    }

    /// Resolve the caller's handle. Consumes the slot.
    pub fn resolve(mut self, outcome: WorkOutcome) {
        let Some(tx) = self.tx.take() else {
            return;
        };

        if tx.send(outcome).is_err() {
            debug!(work_id = %self.work_id, "Caller stopped waiting before completion");
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Err(BridgeError::Cancelled {
                location: ErrorLocation::from(Location::caller()),
            }));
        }
    }
}

/// Awaitable side of a [`Completion`].
///
/// Dropping the handle only stops waiting; the queued work still runs.
#[derive(Debug)]
pub struct CompletionHandle {
    work_id: Uuid,
    rx: oneshot::Receiver<WorkOutcome>,
}

impl CompletionHandle {
    /// Correlation id of the work item.
    pub fn work_id(&self) -> Uuid {
        self.work_id
    }
}

impl Future for CompletionHandle {
    type Output = WorkOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|received| match received {
            Ok(outcome) => outcome,
            Err(_) => Err(BridgeError::Cancelled {
                location: ErrorLocation::from(Location::caller()),
            }),
        })
    }
}
