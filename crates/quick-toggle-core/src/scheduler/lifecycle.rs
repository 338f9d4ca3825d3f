use crate::{CompletionHandle, InstanceId, Scheduler, WorkOutcome};

use std::collections::BTreeSet;

use tokio::task::JoinHandle;
use tracing::{debug, instrument};

/// Notifications a host delivers to the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// The first instance was placed.
    InstanceEnabled,
    /// An instance was removed.
    InstanceDisabled,
    /// The host asks for specific instances to be redrawn.
    HostUpdate {
        /// Instances to redraw.
        ids: BTreeSet<InstanceId>,
    },
    /// The user tapped the toggle on an instance.
    UserTap {
        /// Instance that was tapped.
        instance: InstanceId,
    },
    /// The service reported it started.
    ServiceStarted,
    /// The service reported it stopped.
    ServiceStopped,
    /// The service loaded a profile.
    ProfileLoaded,
    /// The service process was recreated.
    ServiceRecreated,
}

/// Route `event` to the matching façade call.
#[track_caller]
#[instrument(skip(scheduler))]
pub fn dispatch(scheduler: &Scheduler, event: HostEvent) -> CompletionHandle {
    match event {
        HostEvent::UserTap { .. } => scheduler.toggle(),
        HostEvent::HostUpdate { ids } => scheduler.request_update(Some(ids)),
        HostEvent::InstanceEnabled
        | HostEvent::InstanceDisabled
        | HostEvent::ServiceStarted
        | HostEvent::ServiceStopped
        | HostEvent::ProfileLoaded
        | HostEvent::ServiceRecreated => scheduler.request_update(None),
    }
}

/// Await `handle` on the scheduler's runtime and pass the outcome to
/// `on_finish`, letting a host hold its pending result open exactly as long
/// as the work takes.
pub fn finish_when_complete<F>(scheduler: &Scheduler, handle: CompletionHandle, on_finish: F) -> JoinHandle<()>
where
    F: FnOnce(WorkOutcome) + Send + 'static,
{
    scheduler.runtime().spawn(async move {
        let work_id = handle.work_id();
        let outcome = handle.await;
        debug!(%work_id, ok = outcome.is_ok(), "Host result finished");
        on_finish(outcome);
    })
}
