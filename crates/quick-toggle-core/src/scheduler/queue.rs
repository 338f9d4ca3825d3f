//! Unbounded FIFO between the façade and the single worker.
//!
//! The receiving end sits behind an async mutex. A worker holds the lock for
//! its whole life, which is what keeps a second worker from draining at the
//! same time; a replacement worker simply waits for the lock.

use crate::{BridgeError, CompletionHandle, InstanceId, WidgetWork};

use std::{
    collections::BTreeSet,
    panic::Location,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use error_location::ErrorLocation;
use tokio::sync::{Mutex, OwnedMutexGuard, mpsc};
use tracing::{debug, info, warn};

/// Observable state of the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    /// Nothing waiting.
    Empty,
    /// Items are waiting for the worker.
    Draining,
}

struct QueueShared {
    pending: AtomicUsize,
    closed: AtomicBool,
}

/// Create a connected sender/receiver pair.
pub fn work_queue() -> (WorkSender, WorkReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    let shared = Arc::new(QueueShared {
        pending: AtomicUsize::new(0),
        closed: AtomicBool::new(false),
    });

    (
        WorkSender {
            tx,
            shared: Arc::clone(&shared),
        },
        WorkReceiver {
            rx: Arc::new(Mutex::new(rx)),
            shared,
        },
    )
}

/// Producer side. Cheap to clone; never blocks.
#[derive(Clone)]
pub struct WorkSender {
    tx: mpsc::UnboundedSender<WidgetWork>,
    shared: Arc<QueueShared>,
}

impl WorkSender {
    /// Enqueue `work`. A closed queue resolves its completion with
    /// [`BridgeError::QueueClosed`] instead.
    #[track_caller]
    pub fn submit(&self, work: WidgetWork) {
        if self.shared.closed.load(Ordering::Acquire) {
            warn!(work_id = %work.id(), kind = work.kind(), "Queue closed, rejecting work");
            work.abandon(Err(queue_closed(Location::caller())));
            return;
        }

        self.shared.pending.fetch_add(1, Ordering::AcqRel);
        if let Err(mpsc::error::SendError(work)) = self.tx.send(work) {
            self.shared.pending.fetch_sub(1, Ordering::AcqRel);
            warn!(work_id = %work.id(), kind = work.kind(), "Queue closed, rejecting work");
            work.abandon(Err(queue_closed(Location::caller())));
            return;
        }

        debug!(pending = self.pending(), "Work enqueued");
    }

    /// Enqueue an update and return its handle.
    #[track_caller]
    pub fn submit_update(&self, ids: Option<BTreeSet<InstanceId>>) -> CompletionHandle {
        let (work, handle) = WidgetWork::update(ids);
        self.submit(work);
        handle
    }

    /// Enqueue a toggle and return its handle.
    #[track_caller]
    pub fn submit_toggle(&self) -> CompletionHandle {
        let (work, handle) = WidgetWork::toggle();
        self.submit(work);
        handle
    }

    /// Items enqueued but not yet picked up.
    pub fn pending(&self) -> usize {
        self.shared.pending.load(Ordering::Acquire)
    }

    /// [`QueueState`] derived from [`Self::pending`].
    pub fn state(&self) -> QueueState {
        if self.pending() == 0 {
            QueueState::Empty
        } else {
            QueueState::Draining
        }
    }

    /// Whether [`WorkReceiver::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }
}

/// Consumer side, shared by successive workers.
#[derive(Clone)]
pub struct WorkReceiver {
    rx: Arc<Mutex<mpsc::UnboundedReceiver<WidgetWork>>>,
    shared: Arc<QueueShared>,
}

impl WorkReceiver {
    /// Take exclusive draining rights, waiting for a previous worker to let go.
    pub async fn acquire(&self) -> WorkDrain {
        WorkDrain {
            rx: Arc::clone(&self.rx).lock_owned().await,
            shared: Arc::clone(&self.shared),
        }
    }

    /// Reject further submissions. Already queued items stay put until
    /// [`Self::close`] runs.
    pub fn seal(&self) {
        self.shared.closed.store(true, Ordering::Release);
    }

    /// Stop accepting work and cancel everything still queued.
    pub async fn close(&self) {
        self.seal();

        let mut rx = self.rx.lock().await;
        rx.close();

        let mut cancelled = 0usize;
        while let Ok(work) = rx.try_recv() {
            self.shared.pending.fetch_sub(1, Ordering::AcqRel);
            work.abandon(Err(BridgeError::Cancelled {
                location: ErrorLocation::from(Location::caller()),
            }));
            cancelled += 1;
        }

        info!(cancelled, "Work queue closed");
    }
}

/// Exclusive draining rights held by the active worker.
pub struct WorkDrain {
    rx: OwnedMutexGuard<mpsc::UnboundedReceiver<WidgetWork>>,
    shared: Arc<QueueShared>,
}

impl WorkDrain {
    /// Next item, suspending while the queue is empty. `None` once closed.
    pub async fn next(&mut self) -> Option<WidgetWork> {
        let work = self.rx.recv().await;
        if work.is_some() {
            self.shared.pending.fetch_sub(1, Ordering::AcqRel);
        }
        work
    }
}

fn queue_closed(location: &'static Location<'static>) -> BridgeError {
    BridgeError::QueueClosed {
        location: ErrorLocation::from(location),
    }
}
