//! Exporter self-metrics
//!
//! Scrape timing and error counts for the exporter itself, registered in
//! the default registry alongside the process collector.

use prometheus::{register_histogram, register_int_counter, register_int_gauge};
use prometheus::{Histogram, IntCounter, IntGauge};
use std::sync::OnceLock;

/// Scrapes walk a remote inventory, so buckets run well past typical
/// HTTP-handler latencies.
const SCRAPE_BUCKETS: &[f64] = &[0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0];

static GLOBAL_METRICS: OnceLock<ExporterMetricsInner> = OnceLock::new();

struct ExporterMetricsInner {
    scrape_duration_seconds: Histogram,
    scrape_errors_total: IntCounter,
    samples_published: IntGauge,
}

impl ExporterMetricsInner {
    fn new() -> Self {
        Self {
            scrape_duration_seconds: register_histogram!(
                "vperf_scrape_duration_seconds",
                "Time spent collecting from the remote endpoint per scrape",
                SCRAPE_BUCKETS.to_vec()
            )
            .expect("Failed to register scrape_duration_seconds"),

            scrape_errors_total: register_int_counter!(
                "vperf_scrape_errors_total",
                "Total number of scrapes that failed before publishing"
            )
            .expect("Failed to register scrape_errors_total"),

            samples_published: register_int_gauge!(
                "vperf_samples_published",
                "Number of samples published by the most recent scrape"
            )
            .expect("Failed to register samples_published"),
        }
    }
}

/// Lightweight handle to the global exporter metrics.
#[derive(Clone)]
pub struct ExporterMetrics {
    _private: (),
}

impl Default for ExporterMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ExporterMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ExporterMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ExporterMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    pub fn observe_scrape_duration(&self, duration_secs: f64) {
        self.inner().scrape_duration_seconds.observe(duration_secs);
    }

    pub fn inc_scrape_errors(&self) {
        self.inner().scrape_errors_total.inc();
    }

    pub fn set_samples_published(&self, count: i64) {
        self.inner().samples_published.set(count);
    }
}
