use crate::{CoreResult, DisplaySnapshot, InstanceId, Labels, SurfaceHost, build_command};

use std::{collections::BTreeSet, sync::Arc};

use tracing::{debug, error, instrument, warn};

/// Result of a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// No instance was targeted; the periodic refresher can stop.
    NoInstances,
    /// This many instances were redrawn.
    Rendered(usize),
}

/// Issues render commands to the host.
pub struct SurfaceRenderer {
    host: Arc<dyn SurfaceHost>,
    labels: Arc<Labels>,
}

impl SurfaceRenderer {
    /// Create a renderer for `host`.
    pub fn new(host: Arc<dyn SurfaceHost>, labels: Arc<Labels>) -> Self {
        Self { host, labels }
    }

    /// Redraw every instance in `ids` from `snapshot`.
    ///
    /// Every instance is attempted; the first host failure is returned after
    /// the pass.
    #[instrument(skip(self, snapshot), fields(running = snapshot.running, is_error = snapshot.is_error))]
    pub async fn render(
        &self,
        ids: &BTreeSet<InstanceId>,
        snapshot: &DisplaySnapshot,
    ) -> CoreResult<RenderOutcome> {
        if ids.is_empty() {
            debug!("No widget instances to render");
            return Ok(RenderOutcome::NoInstances);
        }

        let mut first_failure = None;
        let mut rendered = 0;

        for &id in ids {
            let command = build_command(id, snapshot, &self.labels);
            match self.host.issue_render_command(command).await {
                Ok(()) => rendered += 1,
                Err(e) => {
                    warn!(instance = ?id, error = ?e, "Host rejected render command");
                    first_failure.get_or_insert(e);
                }
            }
        }

        match first_failure {
            Some(e) => Err(e),
            None => Ok(RenderOutcome::Rendered(rendered)),
        }
    }

    /// Redraw `ids` with the fixed error snapshot. Never fails.
    #[instrument(skip(self))]
    pub async fn render_fallback(&self, ids: &BTreeSet<InstanceId>) {
        let snapshot = DisplaySnapshot::fallback(&self.labels);

        if let Err(e) = self.render(ids, &snapshot).await {
            error!(error = ?e, "Fallback render failed");
        }
    }
}
