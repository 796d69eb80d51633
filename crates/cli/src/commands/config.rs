//! Show the effective scrape-selection configuration

use std::path::Path;

use anyhow::Result;
use serde::Serialize;
use tabled::Tabled;
use vperf_lib::ExporterConfig;

use crate::output::{print_table, OutputFormat};

#[derive(Serialize, Tabled)]
struct CounterRow {
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Rollup")]
    rollup: String,
}

#[derive(Serialize, Tabled)]
struct SelectorRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Type")]
    entity_type: String,
    #[tabled(rename = "Name")]
    name: String,
}

/// Print the configuration the exporter would run with.
pub fn show_config(file: Option<&str>, format: OutputFormat) -> Result<()> {
    let config = ExporterConfig::load_or_default(file.map(Path::new))?;

    match format {
        OutputFormat::Yaml => {
            println!("{}", config.encode()?);
        }
        OutputFormat::Table => {
            let counters: Vec<CounterRow> = config
                .counters
                .iter()
                .map(|c| CounterRow {
                    group: c.group.clone(),
                    name: c.name.clone(),
                    rollup: c.rollup.clone(),
                })
                .collect();
            print_table(&counters, OutputFormat::Table)?;

            let mut selectors: Vec<SelectorRow> = config
                .objects
                .iter()
                .map(|o| SelectorRow {
                    kind: "object".to_string(),
                    entity_type: o.entity_type.to_string(),
                    name: String::new(),
                })
                .collect();
            selectors.extend(config.roots.iter().map(|r| SelectorRow {
                kind: "root".to_string(),
                entity_type: r.entity_type.to_string(),
                name: if r.is_universal() {
                    "(all)".to_string()
                } else {
                    r.name.clone()
                },
            }));
            print_table(&selectors, OutputFormat::Table)?;
        }
    }

    Ok(())
}
