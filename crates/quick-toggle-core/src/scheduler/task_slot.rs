use std::sync::{Mutex, PoisonError};

use tokio::task::JoinHandle;
use tracing::debug;

/// Holds at most one live background task.
pub(crate) struct TaskSlot {
    name: &'static str,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl TaskSlot {
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            name,
            handle: Mutex::new(None),
        }
    }

    /// Spawn a task with `spawn` unless one is still running.
    ///
    /// Returns `true` if a new task was spawned.
    pub(crate) fn ensure(&self, spawn: impl FnOnce() -> JoinHandle<()>) -> bool {
        let mut slot = self.handle.lock().unwrap_or_else(PoisonError::into_inner);

        if slot.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return false;
        }

        *slot = Some(spawn());
        debug!(task = self.name, "Background task armed");
        true
    }

    /// Abort the task, if any. The slot can be re-armed afterwards.
    pub(crate) fn cancel(&self) {
        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(handle) = handle {
            handle.abort();
            debug!(task = self.name, "Background task cancelled");
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}
