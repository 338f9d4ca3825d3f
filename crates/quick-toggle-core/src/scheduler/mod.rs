mod lifecycle;
mod periodic;
mod queue;
#[allow(clippy::module_inception)]
mod scheduler;
mod task_slot;
mod work;
mod worker;

pub(crate) use {
    periodic::PeriodicRefresher,
    queue::work_queue,
    task_slot::TaskSlot,
    worker::{Pipeline, Worker},
};

pub use {
    lifecycle::{HostEvent, dispatch, finish_when_complete},
    periodic::DEFAULT_REFRESH_INTERVAL,
    queue::{QueueState, WorkDrain, WorkReceiver, WorkSender},
    scheduler::{Collaborators, DEFAULT_TOGGLE_GRACE, Scheduler, SchedulerConfig},
    work::{Completion, CompletionHandle, WidgetWork, WorkOutcome},
};
