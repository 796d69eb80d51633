//! Query planning
//!
//! For each discovered entity, the metric ids actually collectable at the
//! resolved interval are intersected with the configured counter
//! selection. Historical queries are bounded to a fixed lookback window so
//! the endpoint does not return a long backlog; live queries rely on
//! `max_samples = 0` meaning "most recent sample only".

use chrono::{DateTime, Duration, Utc};

use crate::error::VimError;
use crate::models::{Entity, IntervalChoice};
use crate::vim::session::Session;
use crate::vim::types::{PerfMetricId, PerfQuerySpec};

/// The smallest common historical rollup granularity.
const LOOKBACK_MINUTES: i64 = 30;

/// Build the bounded query for one entity, or `None` when no configured
/// counter is available at this interval (the entity is skipped for this
/// scrape cycle, not an error).
pub async fn plan_query(
    session: &Session,
    now: DateTime<Utc>,
    entity: &Entity,
    choice: IntervalChoice,
    counter_ids: Option<&[i32]>,
) -> Result<Option<PerfQuerySpec>, VimError> {
    let available = session.available_metrics(&entity.object_ref(), choice.id).await?;

    let metric_ids = filter_metric_ids(counter_ids, available);
    if metric_ids.is_empty() {
        return Ok(None);
    }

    let start_time = if choice.current {
        None
    } else {
        Some(now - Duration::minutes(LOOKBACK_MINUTES))
    };

    Ok(Some(PerfQuerySpec {
        entity: entity.object_ref(),
        interval_id: choice.id,
        metric_ids,
        max_samples: 0,
        start_time,
    }))
}

/// Keep the available metric ids whose counter appears in the configured
/// selection; `None` keeps everything.
pub fn filter_metric_ids(
    counter_ids: Option<&[i32]>,
    available: Vec<PerfMetricId>,
) -> Vec<PerfMetricId> {
    match counter_ids {
        None => available,
        Some(ids) => available
            .into_iter()
            .filter(|m| ids.contains(&m.counter_id))
            .collect(),
    }
}
