//! Interval inspection and one-off performance queries

use anyhow::{Context, Result};
use serde::Serialize;
use tabled::Tabled;
use vperf_lib::models::ManagedEntityType;
use vperf_lib::pipeline::{intervals, PerfContext};
use vperf_lib::scrape;
use vperf_lib::vim::types::ObjectRef;
use vperf_lib::SessionConfig;

use crate::client;
use crate::output::{color_interval, format_instance, print_table, print_warning, OutputFormat};

#[derive(Serialize, Tabled)]
struct IntervalRow {
    #[tabled(rename = "Interval")]
    interval: String,
    #[tabled(rename = "Id")]
    id: i32,
    #[tabled(rename = "Mode")]
    mode: String,
}

#[derive(Serialize, Tabled)]
struct MetricRow {
    #[tabled(rename = "Counter")]
    counter: String,
    #[tabled(rename = "Instance")]
    instance: String,
    #[tabled(rename = "Timestamp")]
    timestamp: String,
    #[tabled(rename = "Value")]
    value: i64,
    #[tabled(rename = "Unit")]
    unit: String,
}

fn parse_type(raw: &str) -> Result<ManagedEntityType> {
    raw.parse::<ManagedEntityType>()
        .with_context(|| format!("unknown entity type '{}'", raw))
}

/// Show every sampling interval one entity supports.
pub async fn show_intervals(
    config: &SessionConfig,
    entity_type: &str,
    entity_id: &str,
    format: OutputFormat,
) -> Result<()> {
    let entity_type = parse_type(entity_type)?;
    let entity = ObjectRef::new(entity_type.wire_name(), entity_id);

    let session = client::connect(config).await?;
    let result = async {
        let ctx = PerfContext::load(&session).await?;
        intervals::list_intervals(&session, &ctx, &entity).await
    }
    .await;
    session.close().await;

    let choices = result?;
    if choices.is_empty() {
        print_warning("entity supports neither live sampling nor historical rollups");
        return Ok(());
    }

    let rows: Vec<IntervalRow> = choices
        .into_iter()
        .map(|c| IntervalRow {
            interval: color_interval(c.id, c.current),
            id: c.id,
            mode: if c.current { "live" } else { "historical" }.to_string(),
        })
        .collect();

    print_table(&rows, format)
}

/// Query one counter on one entity at one interval.
pub async fn query_perf(
    config: &SessionConfig,
    entity_type: &str,
    entity_id: &str,
    counter_id: i32,
    interval_id: i32,
    format: OutputFormat,
) -> Result<()> {
    let entity_type = parse_type(entity_type)?;

    let session = client::connect(config).await?;
    let result =
        scrape::query_entity(&session, entity_type, entity_id, counter_id, interval_id).await;
    session.close().await;

    let metrics = result?;
    if metrics.is_empty() {
        print_warning("no samples returned for this counter and interval");
        return Ok(());
    }

    let rows: Vec<MetricRow> = metrics
        .into_iter()
        .map(|m| MetricRow {
            counter: format!("{}.{}.{}", m.counter.group, m.counter.name, m.counter.rollup),
            instance: format_instance(&m.instance),
            timestamp: m.timestamp.to_rfc3339(),
            value: m.value,
            unit: m.counter.unit,
        })
        .collect();

    print_table(&rows, format)
}
