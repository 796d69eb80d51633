//! End-to-end pipeline tests against a mock endpoint

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use vperf_lib::config::ExporterConfig;
use vperf_lib::gauges::GaugeSet;
use vperf_lib::models::{CounterCatalog, CounterInfo, ManagedEntityType};
use vperf_lib::scrape::{self, Scraper};
use vperf_lib::vim::api::VimApi;
use vperf_lib::vim::session::Session;
use vperf_lib::vim::types::{
    EntityMetrics, ObjectContent, ObjectRef, PerfCounterDesc, PerfInterval, PerfMetricId,
    PerfQuerySpec, PerfSampleInfo, PerfSeries, PropertyFilterSpec, ProviderSummary,
};
use vperf_lib::VimError;

/// A fixed single-host endpoint: one cpu counter, historical sampling
/// only, one sample per query.
struct FixedEndpoint {
    summary_calls: AtomicUsize,
    last_specs: Mutex<Vec<PerfQuerySpec>>,
}

impl FixedEndpoint {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            summary_calls: AtomicUsize::new(0),
            last_specs: Mutex::new(Vec::new()),
        })
    }

    fn session(self: &Arc<Self>) -> Session {
        Session::new(Arc::clone(self) as Arc<dyn VimApi>, Duration::from_secs(5))
    }

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(10_000, 0).unwrap()
    }

    fn sample_time() -> DateTime<Utc> {
        Utc.timestamp_opt(1000, 0).unwrap()
    }
}

#[async_trait]
impl VimApi for FixedEndpoint {
    fn root_folder(&self) -> ObjectRef {
        ObjectRef::new("Folder", "group-d1")
    }

    async fn current_time(&self) -> Result<DateTime<Utc>, VimError> {
        Ok(Self::now())
    }

    async fn retrieve_properties(
        &self,
        _filter: PropertyFilterSpec,
    ) -> Result<Vec<ObjectContent>, VimError> {
        Ok(vec![ObjectContent {
            obj: ObjectRef::new("HostSystem", "host-1"),
            props: HashMap::from([("name".to_string(), "h1".to_string())]),
        }])
    }

    async fn perf_counters(&self) -> Result<Vec<PerfCounterDesc>, VimError> {
        Ok(vec![PerfCounterDesc {
            key: 1,
            group: "cpu".to_string(),
            name: "usage".to_string(),
            summary: "CPU usage".to_string(),
            rollup: "average".to_string(),
            stats: "rate".to_string(),
            unit: "percent".to_string(),
        }])
    }

    async fn historical_intervals(&self) -> Result<Vec<PerfInterval>, VimError> {
        Ok(vec![PerfInterval { sampling_period: 300 }, PerfInterval { sampling_period: 1800 }])
    }

    async fn provider_summary(&self, _entity: &ObjectRef) -> Result<ProviderSummary, VimError> {
        self.summary_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ProviderSummary {
            current_supported: false,
            summary_supported: true,
            refresh_rate: 0,
        })
    }

    async fn available_metrics(
        &self,
        _entity: &ObjectRef,
        _interval_id: i32,
    ) -> Result<Vec<PerfMetricId>, VimError> {
        Ok(vec![
            PerfMetricId { counter_id: 1, instance: String::new() },
            PerfMetricId { counter_id: 55, instance: String::new() },
        ])
    }

    async fn query_perf(&self, specs: Vec<PerfQuerySpec>) -> Result<Vec<EntityMetrics>, VimError> {
        *self.last_specs.lock().unwrap() = specs;
        Ok(vec![EntityMetrics {
            entity: ObjectRef::new("HostSystem", "host-1"),
            sample_info: vec![PerfSampleInfo { timestamp: Self::sample_time(), interval: 300 }],
            series: vec![PerfSeries {
                id: PerfMetricId { counter_id: 1, instance: String::new() },
                values: vec![42],
            }],
        }])
    }

    async fn logout(&self) -> Result<(), VimError> {
        Ok(())
    }
}

fn host_config() -> ExporterConfig {
    ExporterConfig::decode(
        "counters:\n\
         - group: cpu\n\
         \x20 name: usage\n\
         \x20 rollup: average\n\
         objects:\n\
         - type: HostSystem\n",
    )
    .unwrap()
}

fn catalog() -> CounterCatalog {
    CounterCatalog::new(vec![CounterInfo {
        id: 1,
        group: "cpu".to_string(),
        name: "usage".to_string(),
        name_summary: "CPU usage".to_string(),
        rollup: "average".to_string(),
        stats: "rate".to_string(),
        unit: "percent".to_string(),
    }])
}

#[tokio::test]
async fn historical_host_scenario_end_to_end() {
    let endpoint = FixedEndpoint::new();
    let session = endpoint.session();

    let metrics = scrape::collect_metrics(&session, &host_config()).await.unwrap();
    assert_eq!(metrics.len(), 1);

    let metric = &metrics[0];
    assert_eq!(metric.entity.id, "host-1");
    assert_eq!(metric.entity.name, "h1");
    assert_eq!(metric.entity.entity_type, ManagedEntityType::HostSystem);
    assert_eq!(metric.counter.id, 1);
    // No sub-instance on the series: instance defaults to the entity name.
    assert_eq!(metric.instance, "h1");
    assert_eq!(metric.timestamp, FixedEndpoint::sample_time());
    assert_eq!(metric.value, 42);
    assert_eq!(metric.interval, 300);

    // The planned query chose the smallest historical period, bounded the
    // window, and kept only the configured counter.
    let specs = endpoint.last_specs.lock().unwrap().clone();
    assert_eq!(specs.len(), 1);
    assert_eq!(specs[0].interval_id, 300);
    assert_eq!(specs[0].max_samples, 0);
    assert_eq!(
        specs[0].start_time,
        Some(FixedEndpoint::now() - chrono::Duration::minutes(30))
    );
    assert_eq!(specs[0].metric_ids, vec![PerfMetricId { counter_id: 1, instance: String::new() }]);
}

#[tokio::test]
async fn scrape_populates_the_gauge_with_the_sample_timestamp() {
    let endpoint = FixedEndpoint::new();
    let session = endpoint.session();

    let scraper = Scraper::new(host_config(), GaugeSet::build(&catalog()));
    let published = scraper.scrape(&session).await.unwrap();
    assert_eq!(published, 1);

    let families = scraper.gauges().gather();
    assert_eq!(families.len(), 1);
    assert_eq!(families[0].get_name(), "cpu_usage_average");

    let metric = &families[0].get_metric()[0];
    assert_eq!(metric.get_gauge().get_value(), 42.0);
    assert_eq!(metric.get_timestamp_ms(), 1000 * 1000);

    let labels: HashMap<&str, &str> = metric
        .get_label()
        .iter()
        .map(|p| (p.get_name(), p.get_value()))
        .collect();
    assert_eq!(labels["counter_interval"], "300");
    assert_eq!(labels["entity_id"], "host-1");
    assert_eq!(labels["entity_name"], "h1");
    assert_eq!(labels["entity_type"], "HostSystem");
    assert_eq!(labels["entity_instance"], "h1");
}

#[tokio::test]
async fn pipeline_is_idempotent_against_unchanged_remote_state() {
    let endpoint = FixedEndpoint::new();
    let session = endpoint.session();
    let config = host_config();

    let first = scrape::collect_metrics(&session, &config).await.unwrap();
    let second = scrape::collect_metrics(&session, &config).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn repeated_scrapes_do_not_accumulate_stale_series() {
    let endpoint = FixedEndpoint::new();
    let session = endpoint.session();

    let scraper = Scraper::new(host_config(), GaugeSet::build(&catalog()));
    scraper.scrape(&session).await.unwrap();
    scraper.scrape(&session).await.unwrap();

    let total: usize = scraper.gauges().gather().iter().map(|f| f.get_metric().len()).sum();
    assert_eq!(total, 1);
}

#[tokio::test]
async fn interval_is_resolved_once_per_type_per_scrape() {
    let endpoint = FixedEndpoint::new();
    let session = endpoint.session();

    scrape::collect_metrics(&session, &host_config()).await.unwrap();
    assert_eq!(endpoint.summary_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn one_off_entity_query_resolves_counter_and_instance() {
    let endpoint = FixedEndpoint::new();
    let session = endpoint.session();

    let metrics = scrape::query_entity(&session, ManagedEntityType::HostSystem, "host-1", 1, 300)
        .await
        .unwrap();
    assert_eq!(metrics.len(), 1);
    assert_eq!(metrics[0].value, 42);

    let missing =
        scrape::query_entity(&session, ManagedEntityType::HostSystem, "host-9", 1, 300).await;
    assert!(matches!(missing, Err(VimError::EntityNotFound(_))));

    let unknown_counter =
        scrape::query_entity(&session, ManagedEntityType::HostSystem, "host-1", 77, 300).await;
    assert!(matches!(unknown_counter, Err(VimError::CounterNotFound(77))));
}
