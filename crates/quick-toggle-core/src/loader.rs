use crate::{
    CoreResult, DisplaySnapshot, Labels, RemoteBindingSession, ServiceBinder, StatusQuery, traffic,
};

use std::{sync::Arc, time::Duration};

use tracing::{debug, instrument, warn};

/// Builds the [`DisplaySnapshot`] for one refresh.
pub struct StateLoader {
    status: Arc<dyn StatusQuery>,
    binder: Arc<dyn ServiceBinder>,
    bind_timeout: Duration,
    labels: Arc<Labels>,
}

impl StateLoader {
    /// Create a loader over the status path and the binding facility.
    pub fn new(
        status: Arc<dyn StatusQuery>,
        binder: Arc<dyn ServiceBinder>,
        bind_timeout: Duration,
        labels: Arc<Labels>,
    ) -> Self {
        Self {
            status,
            binder,
            bind_timeout,
            labels,
        }
    }

    /// Query status and traffic and assemble a snapshot.
    ///
    /// An unreachable status path reads as "not running" and missing traffic
    /// reads as the placeholder; only a status query that reached the service
    /// and then failed makes the load fail.
    #[instrument(skip(self))]
    pub async fn load(&self) -> CoreResult<DisplaySnapshot> {
        let profile = current_profile(self.status.as_ref()).await?;
        let running = profile.is_some();

        let (upload_text, download_text) = match self.fetch_traffic().await {
            Some(total) => (traffic::upload_text(total), traffic::download_text(total)),
            None => (self.labels.placeholder.clone(), self.labels.placeholder.clone()),
        };

        let status_text = match profile {
            Some(name) if !name.trim().is_empty() => name,
            Some(_) => self.labels.status_active.clone(),
            None => self.labels.status_inactive.clone(),
        };

        debug!(running, status = %status_text, "Widget state loaded");

        Ok(DisplaySnapshot {
            running,
            status_text,
            upload_text,
            download_text,
            is_error: false,
        })
    }

    async fn fetch_traffic(&self) -> Option<u64> {
        let mut session = RemoteBindingSession::new(Arc::clone(&self.binder), self.bind_timeout);

        match session
            .with_session("query_traffic_total", |remote| async move {
                remote.query_traffic_total().await
            })
            .await
        {
            Ok(total) => total,
            Err(e) => {
                warn!(error = ?e, "Traffic unavailable, showing placeholder");
                None
            }
        }
    }
}

/// Current profile through the status path, `None` if the service is stopped
/// or cannot be reached.
pub(crate) async fn current_profile(status: &dyn StatusQuery) -> CoreResult<Option<String>> {
    match status.current_profile_name().await {
        Ok(profile) => Ok(profile),
        Err(e) if e.is_unavailable() => {
            debug!(error = ?e, "Status path unavailable, treating service as stopped");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
