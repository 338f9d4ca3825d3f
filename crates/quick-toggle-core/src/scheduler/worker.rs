use crate::{
    CoreResult, InstanceId, ServiceLauncher, StateLoader, StatusQuery, SurfaceHost,
    SurfaceRenderer, WidgetWork, WorkReceiver, loader::current_profile, scheduler::TaskSlot,
};

use std::{collections::BTreeSet, sync::Arc, time::Duration};

use tracing::{Instrument, error, info, info_span, instrument, warn};

/// Everything a work item needs to execute.
pub(crate) struct Pipeline {
    pub(crate) loader: StateLoader,
    pub(crate) renderer: SurfaceRenderer,
    pub(crate) status: Arc<dyn StatusQuery>,
    pub(crate) launcher: Arc<dyn ServiceLauncher>,
    pub(crate) host: Arc<dyn SurfaceHost>,
    pub(crate) toggle_grace: Duration,
}

/// The single task draining the work queue.
pub(crate) struct Worker {
    pub(crate) queue: WorkReceiver,
    pub(crate) pipeline: Arc<Pipeline>,
    pub(crate) periodic: Arc<TaskSlot>,
}

impl Worker {
    /// Drain until the queue closes or the task is aborted.
    ///
    /// Aborting drops the in-flight item, whose completion then resolves as
    /// cancelled.
    pub(crate) async fn run(self) {
        let mut drain = self.queue.acquire().await;
        info!("Widget worker started");

        while let Some(work) = drain.next().await {
            let span = info_span!("work", work_id = %work.id(), kind = work.kind());
            self.execute(work).instrument(span).await;
        }

        info!("Work queue closed, widget worker exiting");
    }

    async fn execute(&self, work: WidgetWork) {
        match work {
            WidgetWork::Update { ids, completion } => {
                self.refresh(ids).await;
                completion.resolve(Ok(()));
            }
            WidgetWork::Toggle { completion } => {
                let outcome = self.toggle().await;
                completion.resolve(outcome);
            }
        }
    }

    /// Reload and redraw. Failures degrade to the fallback, never propagate.
    #[instrument(skip(self))]
    async fn refresh(&self, ids: Option<BTreeSet<InstanceId>>) {
        let ids = ids.unwrap_or_else(|| self.pipeline.host.registered_instance_ids());

        if ids.is_empty() {
            info!("No widget instances left, stopping periodic refresh");
            self.periodic.cancel();
            return;
        }

        let snapshot = match self.pipeline.loader.load().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = ?e, "Failed to load widget state, rendering fallback");
                self.pipeline.renderer.render_fallback(&ids).await;
                return;
            }
        };

        if let Err(e) = self.pipeline.renderer.render(&ids, &snapshot).await {
            warn!(error = ?e, "Failed to render widget state, rendering fallback");
            self.pipeline.renderer.render_fallback(&ids).await;
        }
    }

    /// Flip the service, wait for it to settle, redraw everything.
    #[instrument(skip(self))]
    async fn toggle(&self) -> CoreResult<()> {
        if let Err(e) = self.switch_service().await {
            error!(error = ?e, "Toggle failed, rendering fallback");
            let ids = self.pipeline.host.registered_instance_ids();
            self.pipeline.renderer.render_fallback(&ids).await;
            return Err(e);
        }

        tokio::time::sleep(self.pipeline.toggle_grace).await;
        self.refresh(None).await;

        Ok(())
    }

    async fn switch_service(&self) -> CoreResult<()> {
        let running = current_profile(self.pipeline.status.as_ref())
            .await?
            .is_some();

        if running {
            self.pipeline.launcher.stop().await?;
            info!("Service stop requested");
        } else {
            if let Some(request) = self.pipeline.launcher.start().await? {
                info!(description = %request.description, "Service needs a permission grant");
                self.pipeline.host.request_permission(request);
            }
            info!("Service start requested");
        }

        Ok(())
    }
}
