use crate::CompletionHandle;

use std::time::Duration;

use tracing::{debug, info, warn};

/// Default pause between periodic refreshes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(8_000);

/// Enqueues one full refresh through the scheduler, re-arming its worker.
///
/// `None` once the scheduler is gone.
pub(crate) type RefreshTick = Box<dyn Fn() -> Option<CompletionHandle> + Send + Sync>;

/// Re-enqueues a full refresh on a fixed interval.
///
/// Stopped by aborting its task: explicitly through the façade, or by the
/// worker when a refresh finds no instances.
pub(crate) struct PeriodicRefresher {
    pub(crate) tick: RefreshTick,
    pub(crate) interval: Duration,
}

impl PeriodicRefresher {
    pub(crate) async fn run(self) {
        info!(interval_ms = self.interval.as_millis() as u64, "Periodic refresh started");

        loop {
            let Some(refresh) = (self.tick)() else {
                info!("Scheduler dropped, periodic refresh exiting");
                return;
            };

            match refresh.await {
                Ok(()) => debug!("Periodic refresh complete"),
                Err(e) if e.is_queue_closed() => {
                    info!("Work queue closed, periodic refresh exiting");
                    return;
                }
                Err(e) => warn!(error = ?e, "Periodic refresh failed"),
            }

            tokio::time::sleep(self.interval).await;
        }
    }
}
