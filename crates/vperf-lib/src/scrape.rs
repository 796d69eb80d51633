//! Scrape orchestration
//!
//! One scrape is one sequential pipeline run: resolve entities under the
//! configured roots, resolve sampling intervals per type, plan one query
//! per entity, execute the batch, materialize, and swap the gauge state.
//! Remote-call failures at the batch level abort the scrape and leave the
//! previous gauge values exposed; everything below that is contained where
//! it happens.

use tracing::{debug, info};

use crate::config::ExporterConfig;
use crate::error::VimError;
use crate::gauges::GaugeSet;
use crate::models::{IntervalChoice, ManagedEntityType, Metric};
use crate::pipeline::{entities, intervals::IntervalCache, materialize, planner, PerfContext};
use crate::vim::session::Session;

/// The pipeline plus the gauge state it refreshes.
pub struct Scraper {
    config: ExporterConfig,
    gauges: GaugeSet,
}

impl Scraper {
    pub fn new(config: ExporterConfig, gauges: GaugeSet) -> Self {
        Self { config, gauges }
    }

    pub fn config(&self) -> &ExporterConfig {
        &self.config
    }

    pub fn gauges(&self) -> &GaugeSet {
        &self.gauges
    }

    /// Run one full pipeline against an open session and replace the gauge
    /// state with the fresh observations. Returns the published count.
    pub async fn scrape(&self, session: &Session) -> Result<usize, VimError> {
        let metrics = collect_metrics(session, &self.config).await?;

        self.gauges.reset();
        let mut published = 0;
        for metric in &metrics {
            if self.gauges.record(metric) {
                published += 1;
            }
        }

        info!(collected = metrics.len(), published, "scrape completed");
        Ok(published)
    }
}

/// Resolve, plan, query, and materialize one scrape's metrics.
pub async fn collect_metrics(
    session: &Session,
    config: &ExporterConfig,
) -> Result<Vec<Metric>, VimError> {
    let now = session.current_time().await?;
    let ctx = PerfContext::load(session).await?;

    let counter_ids: Option<Vec<i32>> = if config.counters.is_empty() {
        None
    } else {
        Some(
            ctx.catalog
                .complement(&config.counters)
                .iter()
                .map(|c| c.id)
                .collect(),
        )
    };

    let roots = entities::resolve_roots(session, &config.roots).await?;
    let found =
        entities::resolve_under_roots(session, roots.as_deref(), &config.object_types()).await?;

    let mut cache = IntervalCache::new();
    let mut specs = Vec::new();
    for entity in &found {
        let choice = cache.resolve(session, &ctx, entity).await;
        if !choice.is_usable() {
            continue;
        }

        if let Some(spec) =
            planner::plan_query(session, now, entity, choice, counter_ids.as_deref()).await?
        {
            specs.push(spec);
        }
    }

    if specs.is_empty() {
        debug!(entities = found.len(), "nothing to query");
        return Ok(Vec::new());
    }

    let results = session.query_perf(specs).await?;
    Ok(materialize::materialize(&ctx.catalog, &found, results))
}

/// One-off query for a single entity/counter/interval; diagnostic path
/// behind the `perf` CLI subcommand.
pub async fn query_entity(
    session: &Session,
    entity_type: ManagedEntityType,
    entity_id: &str,
    counter_id: i32,
    interval_id: i32,
) -> Result<Vec<Metric>, VimError> {
    let ctx = PerfContext::load(session).await?;

    let found = entities::resolve_under_roots(session, None, &[entity_type]).await?;
    let entity = found
        .iter()
        .find(|e| e.id == entity_id)
        .ok_or_else(|| VimError::EntityNotFound(format!("{entity_type}:{entity_id}")))?;

    let now = session.current_time().await?;
    let choice = IntervalChoice { id: interval_id, current: true };
    let spec = planner::plan_query(session, now, entity, choice, Some(&[counter_id]))
        .await?
        .ok_or(VimError::CounterNotFound(counter_id))?;

    let results = session.query_perf(vec![spec]).await?;
    Ok(materialize::materialize(&ctx.catalog, &found, results))
}
