//! In-crate mock of the remote API for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::error::VimError;
use crate::vim::api::VimApi;
use crate::vim::session::Session;
use crate::vim::types::{
    EntityMetrics, ObjectContent, ObjectRef, PerfCounterDesc, PerfInterval, PerfMetricId,
    PerfQuerySpec, PropertyFilterSpec, ProviderSummary,
};

/// Configurable fake endpoint. Responses are fixed up front; call counts
/// and the last requests are recorded for assertions.
pub struct MockVim {
    pub root: ObjectRef,
    pub time: DateTime<Utc>,
    pub contents: Vec<ObjectContent>,
    pub counters: Vec<PerfCounterDesc>,
    pub intervals: Vec<PerfInterval>,
    /// Provider summaries keyed by entity type; a missing key fails the call.
    pub summaries: HashMap<String, ProviderSummary>,
    /// Available metric ids keyed by entity id.
    pub available: HashMap<String, Vec<PerfMetricId>>,
    pub query_result: Vec<EntityMetrics>,

    pub retrieve_calls: AtomicUsize,
    pub summary_calls: AtomicUsize,
    pub available_calls: AtomicUsize,
    pub query_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    pub last_filter: Mutex<Option<PropertyFilterSpec>>,
    pub last_specs: Mutex<Vec<PerfQuerySpec>>,
}

impl Default for MockVim {
    fn default() -> Self {
        Self {
            root: ObjectRef::new("Folder", "group-d1"),
            time: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            contents: Vec::new(),
            counters: Vec::new(),
            intervals: Vec::new(),
            summaries: HashMap::new(),
            available: HashMap::new(),
            query_result: Vec::new(),
            retrieve_calls: AtomicUsize::new(0),
            summary_calls: AtomicUsize::new(0),
            available_calls: AtomicUsize::new(0),
            query_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
            last_filter: Mutex::new(None),
            last_specs: Mutex::new(Vec::new()),
        }
    }
}

impl MockVim {
    pub fn session(self: &Arc<Self>) -> Session {
        Session::new(Arc::clone(self) as Arc<dyn VimApi>, Duration::from_secs(5))
    }
}

/// A raw retrieval record with just a name property.
pub fn content(entity_type: &str, id: &str, name: &str) -> ObjectContent {
    ObjectContent {
        obj: ObjectRef::new(entity_type, id),
        props: HashMap::from([("name".to_string(), name.to_string())]),
    }
}

pub fn counter_desc(key: i32, group: &str, name: &str, rollup: &str) -> PerfCounterDesc {
    PerfCounterDesc {
        key,
        group: group.to_string(),
        name: name.to_string(),
        summary: format!("{group} {name} ({rollup})"),
        rollup: rollup.to_string(),
        stats: "absolute".to_string(),
        unit: "percent".to_string(),
    }
}

#[async_trait]
impl VimApi for MockVim {
    fn root_folder(&self) -> ObjectRef {
        self.root.clone()
    }

    async fn current_time(&self) -> Result<DateTime<Utc>, VimError> {
        Ok(self.time)
    }

    async fn retrieve_properties(
        &self,
        filter: PropertyFilterSpec,
    ) -> Result<Vec<ObjectContent>, VimError> {
        self.retrieve_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_filter.lock().unwrap() = Some(filter);
        Ok(self.contents.clone())
    }

    async fn perf_counters(&self) -> Result<Vec<PerfCounterDesc>, VimError> {
        Ok(self.counters.clone())
    }

    async fn historical_intervals(&self) -> Result<Vec<PerfInterval>, VimError> {
        Ok(self.intervals.clone())
    }

    async fn provider_summary(&self, entity: &ObjectRef) -> Result<ProviderSummary, VimError> {
        self.summary_calls.fetch_add(1, Ordering::SeqCst);
        self.summaries
            .get(&entity.entity_type)
            .copied()
            .ok_or_else(|| VimError::Fault(format!("no summary for {}", entity.entity_type)))
    }

    async fn available_metrics(
        &self,
        entity: &ObjectRef,
        _interval_id: i32,
    ) -> Result<Vec<PerfMetricId>, VimError> {
        self.available_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.available.get(&entity.id).cloned().unwrap_or_default())
    }

    async fn query_perf(&self, specs: Vec<PerfQuerySpec>) -> Result<Vec<EntityMetrics>, VimError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_specs.lock().unwrap() = specs;
        Ok(self.query_result.clone())
    }

    async fn logout(&self) -> Result<(), VimError> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
