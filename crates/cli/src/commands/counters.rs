//! List the endpoint's performance counter catalog

use anyhow::Result;
use serde::Serialize;
use tabled::Tabled;
use vperf_lib::pipeline::PerfContext;
use vperf_lib::SessionConfig;

use crate::client;
use crate::output::{print_table, OutputFormat};

#[derive(Serialize, Tabled)]
struct CounterRow {
    #[tabled(rename = "Id")]
    id: i32,
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Rollup")]
    rollup: String,
    #[tabled(rename = "Stats")]
    stats: String,
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "Summary")]
    summary: String,
}

/// List every counter the endpoint knows, sorted by id.
pub async fn list_counters(config: &SessionConfig, format: OutputFormat) -> Result<()> {
    let session = client::connect(config).await?;
    let result = PerfContext::load(&session).await;
    session.close().await;

    let ctx = result?;
    let mut rows: Vec<CounterRow> = ctx
        .catalog
        .counters()
        .iter()
        .map(|c| CounterRow {
            id: c.id,
            group: c.group.clone(),
            name: c.name.clone(),
            rollup: c.rollup.clone(),
            stats: c.stats.clone(),
            unit: c.unit.clone(),
            summary: c.name_summary.clone(),
        })
        .collect();
    rows.sort_by_key(|r| r.id);

    print_table(&rows, format)
}
