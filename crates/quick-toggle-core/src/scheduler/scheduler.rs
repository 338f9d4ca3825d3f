//! Entry points for everything that wants the widget redrawn or toggled.
//!
//! One [`Scheduler`] per process, constructed at startup and cloned into
//! every caller. It owns the work queue, the worker slot and the periodic
//! slot; both tasks are armed lazily on the first call and re-armed after
//! they stop.

use crate::{
    CompletionHandle, InstanceId, Labels, QueueState, ServiceBinder, ServiceLauncher,
    StateLoader, StatusQuery, SurfaceHost, SurfaceRenderer, WorkReceiver, WorkSender,
    remote::DEFAULT_BIND_TIMEOUT,
    scheduler::{
        DEFAULT_REFRESH_INTERVAL, PeriodicRefresher, Pipeline, TaskSlot, Worker, work_queue,
    },
};

use std::{collections::BTreeSet, sync::Arc, time::Duration};

use tokio::runtime::Handle;
use tracing::{info, instrument};

/// Default pause between a successful toggle and its redraw.
pub const DEFAULT_TOGGLE_GRACE: Duration = Duration::from_millis(500);

/// Timing and text settings for a [`Scheduler`].
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Pause between periodic refreshes.
    pub refresh_interval: Duration,
    /// Deadline for each binding session.
    pub bind_timeout: Duration,
    /// Pause after start/stop before redrawing.
    pub toggle_grace: Duration,
    /// User-visible strings.
    pub labels: Labels,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            bind_timeout: DEFAULT_BIND_TIMEOUT,
            toggle_grace: DEFAULT_TOGGLE_GRACE,
            labels: Labels::default(),
        }
    }
}

/// External collaborators the scheduler drives.
#[derive(Clone)]
pub struct Collaborators {
    /// Surface host.
    pub host: Arc<dyn SurfaceHost>,
    /// Lightweight status path.
    pub status: Arc<dyn StatusQuery>,
    /// Binding facility for remote sessions.
    pub binder: Arc<dyn ServiceBinder>,
    /// Start/stop of the service.
    pub launcher: Arc<dyn ServiceLauncher>,
}

struct SchedulerInner {
    runtime: Handle,
    sender: WorkSender,
    receiver: WorkReceiver,
    pipeline: Arc<Pipeline>,
    worker: Arc<TaskSlot>,
    periodic: Arc<TaskSlot>,
    refresh_interval: Duration,
}

/// Serialized widget work scheduler.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<SchedulerInner>,
}

impl Scheduler {
    /// Build a scheduler whose tasks run on `runtime`.
    ///
    /// Nothing is spawned until the first call.
    pub fn new(collaborators: Collaborators, config: SchedulerConfig, runtime: Handle) -> Self {
        let labels = Arc::new(config.labels);
        let (sender, receiver) = work_queue();

        let pipeline = Pipeline {
            loader: StateLoader::new(
                Arc::clone(&collaborators.status),
                collaborators.binder,
                config.bind_timeout,
                Arc::clone(&labels),
            ),
            renderer: SurfaceRenderer::new(Arc::clone(&collaborators.host), labels),
            status: collaborators.status,
            launcher: collaborators.launcher,
            host: collaborators.host,
            toggle_grace: config.toggle_grace,
        };

        Self {
            inner: Arc::new(SchedulerInner {
                runtime,
                sender,
                receiver,
                pipeline: Arc::new(pipeline),
                worker: Arc::new(TaskSlot::new("widget-worker")),
                periodic: Arc::new(TaskSlot::new("periodic-refresh")),
                refresh_interval: config.refresh_interval,
            }),
        }
    }

    /// Make sure the worker and the periodic refresher are running.
    #[instrument(skip(self))]
    pub fn start(&self) {
        self.ensure_tasks();
    }

    /// Stop periodic refreshing. The worker keeps draining queued work.
    #[instrument(skip(self))]
    pub fn stop(&self) {
        self.inner.periodic.cancel();
        info!("Periodic refresh stopped");
    }

    /// Queue a redraw of `ids`, or of every registered instance for `None`.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn request_update(&self, ids: Option<BTreeSet<InstanceId>>) -> CompletionHandle {
        self.ensure_tasks();
        self.inner.sender.submit_update(ids)
    }

    /// Queue a start/stop of the service followed by a full redraw.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn toggle(&self) -> CompletionHandle {
        self.ensure_tasks();
        self.inner.sender.submit_toggle()
    }

    /// Tear everything down for process exit.
    ///
    /// Both tasks are aborted, further calls resolve with `QueueClosed`, and
    /// anything still queued resolves with `Cancelled`.
    #[instrument(skip(self))]
    pub fn shutdown(&self) {
        self.inner.periodic.cancel();
        self.inner.worker.cancel();

        let receiver = self.inner.receiver.clone();
        receiver.seal();
        self.inner.runtime.spawn(async move {
            receiver.close().await;
        });

        info!("Scheduler shut down");
    }

    /// Whether a worker task is alive.
    pub fn is_worker_active(&self) -> bool {
        self.inner.worker.is_active()
    }

    /// Whether the periodic refresher is alive.
    pub fn is_periodic_active(&self) -> bool {
        self.inner.periodic.is_active()
    }

    /// Whether work is waiting for the worker.
    pub fn queue_state(&self) -> QueueState {
        self.inner.sender.state()
    }

    /// Runtime the scheduler spawns on.
    pub fn runtime(&self) -> &Handle {
        &self.inner.runtime
    }

    #[cfg(test)]
    pub(crate) fn abort_worker(&self) {
        self.inner.worker.cancel();
    }

    fn ensure_tasks(&self) {
        if self.inner.sender.is_closed() {
            return;
        }

        self.inner.ensure_worker();

        let inner = &self.inner;
        inner.periodic.ensure(|| {
            let weak = Arc::downgrade(inner);
            let refresher = PeriodicRefresher {
                tick: Box::new(move || {
                    let inner = weak.upgrade()?;
                    inner.ensure_worker();
                    Some(inner.sender.submit_update(None))
                }),
                interval: inner.refresh_interval,
            };
            inner.runtime.spawn(refresher.run())
        });
    }
}

impl SchedulerInner {
    /// Re-arm the worker if it is not running. Leaves the periodic slot alone.
    fn ensure_worker(&self) {
        if self.sender.is_closed() {
            return;
        }

        self.worker.ensure(|| {
            let worker = Worker {
                queue: self.receiver.clone(),
                pipeline: Arc::clone(&self.pipeline),
                periodic: Arc::clone(&self.periodic),
            };
            self.runtime.spawn(worker.run())
        });
    }
}
