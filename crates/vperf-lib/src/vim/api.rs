//! The remote-API boundary consumed by the scrape pipeline
//!
//! Authentication, transport, and wire encoding live behind this trait;
//! the pipeline only ever sees typed requests and responses. Tests swap in
//! mock implementations at this seam.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::VimError;
use crate::vim::types::{
    EntityMetrics, ObjectContent, ObjectRef, PerfCounterDesc, PerfInterval, PerfMetricId,
    PerfQuerySpec, PropertyFilterSpec, ProviderSummary,
};

#[async_trait]
pub trait VimApi: Send + Sync {
    /// The endpoint's global inventory root.
    fn root_folder(&self) -> ObjectRef;

    /// The endpoint's clock, used to bound historical query windows.
    async fn current_time(&self) -> Result<DateTime<Utc>, VimError>;

    /// One bulk property retrieval driven by a traversal specification.
    async fn retrieve_properties(
        &self,
        filter: PropertyFilterSpec,
    ) -> Result<Vec<ObjectContent>, VimError>;

    /// The full performance counter catalog.
    async fn perf_counters(&self) -> Result<Vec<PerfCounterDesc>, VimError>;

    /// Historical rollup periods configured on the endpoint.
    async fn historical_intervals(&self) -> Result<Vec<PerfInterval>, VimError>;

    /// Sampling capabilities for one entity.
    async fn provider_summary(&self, entity: &ObjectRef) -> Result<ProviderSummary, VimError>;

    /// Metric ids actually collectable for `(entity, interval)`.
    async fn available_metrics(
        &self,
        entity: &ObjectRef,
        interval_id: i32,
    ) -> Result<Vec<PerfMetricId>, VimError>;

    /// Execute a batch of performance queries in one round trip.
    async fn query_perf(&self, specs: Vec<PerfQuerySpec>) -> Result<Vec<EntityMetrics>, VimError>;

    /// Invalidate the session on the endpoint.
    async fn logout(&self) -> Result<(), VimError>;
}
