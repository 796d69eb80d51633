//! Sampling interval resolution
//!
//! Whether an entity supports live sampling or only historical rollups is
//! a property of its type on a given endpoint, so the resolution is cached
//! per type for the lifetime of one scrape: one provider-summary round
//! trip per distinct type, no matter how many entities share it.

use std::collections::HashMap;

use tracing::warn;

use crate::error::VimError;
use crate::models::{Entity, IntervalChoice, ManagedEntityType};
use crate::pipeline::PerfContext;
use crate::vim::session::Session;
use crate::vim::types::ObjectRef;

/// Scrape-scoped cache of per-type interval choices.
#[derive(Debug, Default)]
pub struct IntervalCache {
    cache: HashMap<ManagedEntityType, IntervalChoice>,
}

impl IntervalCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The best usable interval for this entity's type.
    ///
    /// A summary failure is logged and cached as the unsupported sentinel:
    /// the type sits out this scrape instead of aborting it.
    pub async fn resolve(
        &mut self,
        session: &Session,
        ctx: &PerfContext,
        entity: &Entity,
    ) -> IntervalChoice {
        if let Some(choice) = self.cache.get(&entity.entity_type) {
            return *choice;
        }

        let choice = match best_interval(session, ctx, &entity.object_ref()).await {
            Ok(Some(choice)) => choice,
            Ok(None) => IntervalChoice::UNSUPPORTED,
            Err(error) => {
                warn!(%error, entity_type = %entity.entity_type, "could not resolve sampling interval");
                IntervalChoice::UNSUPPORTED
            }
        };

        self.cache.insert(entity.entity_type, choice);
        choice
    }
}

/// Prefer live sampling at the provider's refresh rate; fall back to the
/// smallest configured historical rollup period.
async fn best_interval(
    session: &Session,
    ctx: &PerfContext,
    entity: &ObjectRef,
) -> Result<Option<IntervalChoice>, VimError> {
    let summary = session.provider_summary(entity).await?;

    if summary.current_supported {
        return Ok(Some(IntervalChoice { id: summary.refresh_rate, current: true }));
    }

    if summary.summary_supported {
        let smallest = ctx.historical.iter().map(|i| i.sampling_period).min();
        return Ok(smallest.map(|id| IntervalChoice { id, current: false }));
    }

    Ok(None)
}

/// All usable intervals for one entity, live first; diagnostic output for
/// the `intervals` CLI subcommand.
pub async fn list_intervals(
    session: &Session,
    ctx: &PerfContext,
    entity: &ObjectRef,
) -> Result<Vec<IntervalChoice>, VimError> {
    let summary = session.provider_summary(entity).await?;

    let mut choices = Vec::new();
    if summary.current_supported {
        choices.push(IntervalChoice { id: summary.refresh_rate, current: true });
    }
    if summary.summary_supported {
        for interval in &ctx.historical {
            choices.push(IntervalChoice { id: interval.sampling_period, current: false });
        }
    }

    Ok(choices)
}
