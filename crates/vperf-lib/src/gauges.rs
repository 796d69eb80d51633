//! Gauge registry
//!
//! One resettable gauge per catalog counter, built once at startup and
//! repopulated on every scrape. Observations keep their source timestamp:
//! historical samples can be minutes stale, so the exposition must carry
//! the sample time, not the gather time. That rules out the stock
//! `GaugeVec`, which timestamps nothing; each gauge is a custom
//! [`Collector`] emitting protobuf families with `timestamp_ms` set.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use prometheus::core::{Collector, Desc};
use prometheus::proto;
use prometheus::Registry;
use tracing::warn;

use crate::error::VimError;
use crate::models::{CounterCatalog, CounterInfo, Metric};

pub const LABEL_COUNTER_ID: &str = "counter_id";
pub const LABEL_COUNTER_STAT: &str = "counter_stat";
pub const LABEL_COUNTER_UNIT: &str = "counter_unit";
pub const LABEL_COUNTER_INTERVAL: &str = "counter_interval";
pub const LABEL_ENTITY_ID: &str = "entity_id";
pub const LABEL_ENTITY_NAME: &str = "entity_name";
pub const LABEL_ENTITY_TYPE: &str = "entity_type";
pub const LABEL_ENTITY_INSTANCE: &str = "entity_instance";

/// Variable label values, in declaration order:
/// interval, entity id, entity name, entity type, instance.
pub type LabelValues = [String; 5];

#[derive(Debug, Clone, Copy)]
struct Sample {
    value: f64,
    timestamp_ms: i64,
}

struct GaugeInner {
    id: i32,
    desc: Desc,
    samples: DashMap<LabelValues, Sample>,
}

/// A labeled, resettable gauge for one performance counter.
#[derive(Clone)]
pub struct PerfGauge {
    inner: Arc<GaugeInner>,
}

impl PerfGauge {
    fn new(counter: &CounterInfo) -> Result<Self, VimError> {
        let name = gauge_name(counter);
        let help = if counter.name_summary.is_empty() {
            name.clone()
        } else {
            counter.name_summary.clone()
        };

        let const_labels = HashMap::from([
            (LABEL_COUNTER_ID.to_string(), counter.id.to_string()),
            (LABEL_COUNTER_STAT.to_string(), counter.stats.clone()),
            (LABEL_COUNTER_UNIT.to_string(), counter.unit.clone()),
        ]);
        let variable_labels = vec![
            LABEL_COUNTER_INTERVAL.to_string(),
            LABEL_ENTITY_ID.to_string(),
            LABEL_ENTITY_NAME.to_string(),
            LABEL_ENTITY_TYPE.to_string(),
            LABEL_ENTITY_INSTANCE.to_string(),
        ];
        let desc = Desc::new(name, help, variable_labels, const_labels)?;

        Ok(Self {
            inner: Arc::new(GaugeInner { id: counter.id, desc, samples: DashMap::new() }),
        })
    }

    pub fn id(&self) -> i32 {
        self.inner.id
    }

    /// Drop every label combination. Combinations set before a reset read
    /// back as absent, not as zero.
    pub fn reset(&self) {
        self.inner.samples.clear();
    }

    pub fn set(&self, labels: LabelValues, value: f64, timestamp_ms: i64) {
        self.inner.samples.insert(labels, Sample { value, timestamp_ms });
    }

    /// The current value at a label combination, if set.
    pub fn get(&self, labels: &LabelValues) -> Option<f64> {
        self.inner.samples.get(labels).map(|s| s.value)
    }
}

impl Collector for PerfGauge {
    fn desc(&self) -> Vec<&Desc> {
        vec![&self.inner.desc]
    }

    fn collect(&self) -> Vec<proto::MetricFamily> {
        let desc = &self.inner.desc;

        let mut family = proto::MetricFamily::default();
        family.set_name(desc.fq_name.clone());
        family.set_help(desc.help.clone());
        family.set_field_type(proto::MetricType::GAUGE);

        for entry in self.inner.samples.iter() {
            let mut metric = proto::Metric::default();
            for pair in &desc.const_label_pairs {
                metric.mut_label().push(pair.clone());
            }
            for (name, value) in desc.variable_labels.iter().zip(entry.key().iter()) {
                let mut pair = proto::LabelPair::default();
                pair.set_name(name.clone());
                pair.set_value(value.clone());
                metric.mut_label().push(pair);
            }

            let mut gauge = proto::Gauge::default();
            gauge.set_value(entry.value().value);
            metric.set_gauge(gauge);
            metric.set_timestamp_ms(entry.value().timestamp_ms);
            family.mut_metric().push(metric);
        }

        vec![family]
    }
}

/// All gauges for one endpoint, keyed by counter id and registered in one
/// registry for exposition.
pub struct GaugeSet {
    registry: Registry,
    by_id: HashMap<i32, PerfGauge>,
}

impl GaugeSet {
    /// Build one gauge per catalog counter. Counters whose descriptor is
    /// rejected are skipped with a warning; their metrics will be dropped
    /// at record time. Counters sharing a semantic key stay distinct: the
    /// `counter_id` const label partitions them within one family.
    pub fn build(catalog: &CounterCatalog) -> Self {
        let registry = Registry::new();
        let mut by_id = HashMap::new();

        for counter in catalog.counters() {
            let gauge = match PerfGauge::new(counter) {
                Ok(gauge) => gauge,
                Err(error) => {
                    warn!(%error, counter_id = counter.id, "could not build gauge");
                    continue;
                }
            };
            if let Err(error) = registry.register(Box::new(gauge.clone())) {
                warn!(%error, counter_id = counter.id, "could not register gauge");
                continue;
            }
            by_id.insert(counter.id, gauge);
        }

        Self { registry, by_id }
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn gauge(&self, counter_id: i32) -> Option<&PerfGauge> {
        self.by_id.get(&counter_id)
    }

    /// Clear every gauge; stale label combinations from entities that
    /// disappeared or changed instances must not survive a scrape.
    pub fn reset(&self) {
        for gauge in self.by_id.values() {
            gauge.reset();
        }
    }

    /// Record one metric at its gauge. Returns false (after a warning)
    /// when no gauge matches the metric's counter id.
    pub fn record(&self, metric: &Metric) -> bool {
        let Some(gauge) = self.by_id.get(&metric.counter.id) else {
            warn!(counter_id = metric.counter.id, "no gauge for counter");
            return false;
        };

        gauge.set(
            Self::labels_for(metric),
            metric.value as f64,
            metric.timestamp.timestamp_millis(),
        );
        true
    }

    pub fn labels_for(metric: &Metric) -> LabelValues {
        [
            metric.interval.to_string(),
            metric.entity.id.clone(),
            metric.entity.name.clone(),
            metric.entity.entity_type.wire_name().to_string(),
            metric.instance.clone(),
        ]
    }

    /// Snapshot every family for exposition.
    pub fn gather(&self) -> Vec<proto::MetricFamily> {
        self.registry.gather()
    }
}

/// Exposition-safe gauge name from the counter's semantic key.
fn gauge_name(counter: &CounterInfo) -> String {
    let raw = format!("{}_{}_{}", counter.group, counter.name, counter.rollup);
    let mut name = String::with_capacity(raw.len());
    for (i, c) in raw.chars().enumerate() {
        let keep = c.is_ascii_alphabetic() || c == '_' || c == ':' || (i > 0 && c.is_ascii_digit());
        name.push(if keep { c } else { '_' });
    }

    name
}
