//! Metric materialization
//!
//! Decodes raw query results into canonical [`Metric`] records. Historical
//! queries can return several sample points regardless of the requested
//! maximum, and this exporter reports "latest known value" rather than a
//! backlog, so exactly one point per series survives: the one with the
//! highest timestamp, first-seen winning ties.

use tracing::warn;

use crate::models::{CounterCatalog, Entity, Metric};
use crate::vim::types::{EntityMetrics, PerfSampleInfo};

/// Decode one query batch. Series that cannot be matched back to a
/// resolved entity are skipped whole; series whose counter is missing from
/// the catalog drop that one record. Both are warnings, never fatal.
pub fn materialize(
    catalog: &CounterCatalog,
    entities: &[Entity],
    results: Vec<EntityMetrics>,
) -> Vec<Metric> {
    let mut metrics = Vec::new();

    for result in results {
        let Some(entity) = entities
            .iter()
            .find(|e| e.id == result.entity.id && e.entity_type.wire_name() == result.entity.entity_type)
        else {
            warn!(
                entity_type = %result.entity.entity_type,
                id = %result.entity.id,
                "series for unresolved entity"
            );
            continue;
        };

        let Some((index, sample)) = latest_sample(&result.sample_info) else {
            continue;
        };

        for series in &result.series {
            let Some(counter) = catalog.find_by_id(series.id.counter_id) else {
                warn!(counter_id = series.id.counter_id, "counter not in catalog");
                continue;
            };
            let Some(&value) = series.values.get(index) else {
                warn!(counter_id = series.id.counter_id, "series shorter than sample info");
                continue;
            };

            let instance = if series.id.instance.is_empty() {
                entity.name.clone()
            } else {
                series.id.instance.clone()
            };

            metrics.push(Metric {
                entity: entity.clone(),
                counter: counter.clone(),
                instance,
                timestamp: sample.timestamp,
                value,
                interval: sample.interval,
            });
        }
    }

    metrics
}

/// Index and sample info of the most recent point; strictly-greater
/// comparison keeps the first of equal timestamps.
fn latest_sample(samples: &[PerfSampleInfo]) -> Option<(usize, PerfSampleInfo)> {
    let mut best: Option<(usize, PerfSampleInfo)> = None;
    for (index, sample) in samples.iter().enumerate() {
        match &best {
            Some((_, current)) if sample.timestamp <= current.timestamp => {}
            _ => best = Some((index, *sample)),
        }
    }

    best
}
