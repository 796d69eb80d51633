//! Session gateway: deadline enforcement over a [`VimApi`] handle
//!
//! Every remote operation is bounded by the configured per-call timeout
//! independently; a timeout on one call does not abort calls that already
//! completed. A session is explicitly closed after use, on error paths
//! included, and closing never fails the caller.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::error::VimError;
use crate::vim::api::VimApi;
use crate::vim::types::{
    EntityMetrics, ObjectContent, ObjectRef, PerfCounterDesc, PerfInterval, PerfMetricId,
    PerfQuerySpec, PropertyFilterSpec, ProviderSummary,
};

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Where and how to open sessions.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    /// Skip certificate verification on the endpoint.
    #[serde(default)]
    pub insecure: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl SessionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// An authenticated handle valid for the duration of one scrape.
pub struct Session {
    api: Arc<dyn VimApi>,
    timeout: Duration,
    /// Cleared once `close` has run the logout, so drop does not log
    /// out twice.
    open: bool,
}

impl Session {
    pub fn new(api: Arc<dyn VimApi>, timeout: Duration) -> Self {
        Self { api, timeout, open: true }
    }

    async fn deadline<T, F>(&self, fut: F) -> Result<T, VimError>
    where
        F: Future<Output = Result<T, VimError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(VimError::Timeout(self.timeout)),
        }
    }

    pub fn root_folder(&self) -> ObjectRef {
        self.api.root_folder()
    }

    pub async fn current_time(&self) -> Result<DateTime<Utc>, VimError> {
        self.deadline(self.api.current_time()).await
    }

    pub async fn retrieve_properties(
        &self,
        filter: PropertyFilterSpec,
    ) -> Result<Vec<ObjectContent>, VimError> {
        self.deadline(self.api.retrieve_properties(filter)).await
    }

    pub async fn perf_counters(&self) -> Result<Vec<PerfCounterDesc>, VimError> {
        self.deadline(self.api.perf_counters()).await
    }

    pub async fn historical_intervals(&self) -> Result<Vec<PerfInterval>, VimError> {
        self.deadline(self.api.historical_intervals()).await
    }

    pub async fn provider_summary(&self, entity: &ObjectRef) -> Result<ProviderSummary, VimError> {
        self.deadline(self.api.provider_summary(entity)).await
    }

    pub async fn available_metrics(
        &self,
        entity: &ObjectRef,
        interval_id: i32,
    ) -> Result<Vec<PerfMetricId>, VimError> {
        self.deadline(self.api.available_metrics(entity, interval_id)).await
    }

    pub async fn query_perf(
        &self,
        specs: Vec<PerfQuerySpec>,
    ) -> Result<Vec<EntityMetrics>, VimError> {
        self.deadline(self.api.query_perf(specs)).await
    }

    /// Log out and release the session. Failures are logged, not
    /// propagated; the scrape outcome was decided before this point.
    pub async fn close(mut self) {
        if let Err(error) = self.deadline(self.api.logout()).await {
            warn!(%error, "logout failed");
        }
        self.open = false;
    }
}

/// A session dropped without `close` (a scrape future cancelled by a
/// client disconnect, for instance) still releases the remote session:
/// the logout runs as a detached task on the current runtime.
impl Drop for Session {
    fn drop(&mut self) {
        if !self.open {
            return;
        }
        let api = Arc::clone(&self.api);
        let timeout = self.timeout;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    match tokio::time::timeout(timeout, api.logout()).await {
                        Ok(Ok(())) => {}
                        Ok(Err(error)) => warn!(%error, "logout on drop failed"),
                        Err(_) => warn!("logout on drop timed out"),
                    }
                });
            }
            Err(_) => warn!("session dropped outside a runtime; remote session not released"),
        }
    }
}
