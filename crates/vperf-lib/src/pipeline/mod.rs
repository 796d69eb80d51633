//! The scrape pipeline: entity resolution, interval resolution, query
//! planning, and metric materialization.

pub mod entities;
pub mod intervals;
pub mod materialize;
pub mod planner;

use serde::{Deserialize, Serialize};

use crate::error::VimError;
use crate::models::{CounterCatalog, CounterInfo, ManagedEntityType};
use crate::vim::session::Session;
use crate::vim::types::{PerfCounterDesc, PerfInterval};

impl From<PerfCounterDesc> for CounterInfo {
    fn from(desc: PerfCounterDesc) -> Self {
        CounterInfo {
            id: desc.key,
            group: desc.group,
            name: desc.name,
            name_summary: desc.summary,
            rollup: desc.rollup,
            stats: desc.stats,
            unit: desc.unit,
        }
    }
}

/// Performance metadata loaded once per scrape: the counter catalog and
/// the endpoint's historical rollup table.
#[derive(Debug, Clone, Default)]
pub struct PerfContext {
    pub catalog: CounterCatalog,
    pub historical: Vec<PerfInterval>,
}

impl PerfContext {
    pub async fn load(session: &Session) -> Result<Self, VimError> {
        let counters = session
            .perf_counters()
            .await?
            .into_iter()
            .map(CounterInfo::from)
            .collect();
        let historical = session.historical_intervals().await?;
        Ok(Self { catalog: CounterCatalog::new(counters), historical })
    }
}

/// One available counter/instance pair on one entity; diagnostic output
/// for the `instances` CLI subcommand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceInfo {
    pub entity_type: ManagedEntityType,
    pub entity_id: String,
    pub entity_name: String,
    pub instance: String,
    pub counter_id: i32,
}

/// Enumerate every available counter instance for every discoverable
/// entity of the given types. The planner runs with no counter filter.
pub async fn list_instances(
    session: &Session,
    types: &[ManagedEntityType],
) -> Result<Vec<InstanceInfo>, VimError> {
    let now = session.current_time().await?;
    let ctx = PerfContext::load(session).await?;

    let found = entities::resolve_under_roots(session, None, types).await?;

    let mut cache = intervals::IntervalCache::new();
    let mut info = Vec::new();
    for entity in &found {
        let choice = cache.resolve(session, &ctx, entity).await;
        if !choice.is_usable() {
            continue;
        }

        let Some(spec) = planner::plan_query(session, now, entity, choice, None).await? else {
            continue;
        };
        for id in spec.metric_ids {
            info.push(InstanceInfo {
                entity_type: entity.entity_type,
                entity_id: entity.id.clone(),
                entity_name: entity.name.clone(),
                instance: id.instance,
                counter_id: id.counter_id,
            });
        }
    }

    Ok(info)
}
