//! Inventory discovery commands

use anyhow::Result;
use serde::Serialize;
use tabled::Tabled;
use vperf_lib::pipeline::{self, entities};
use vperf_lib::{RootSelector, SessionConfig};

use crate::client;
use crate::output::{format_instance, print_table, OutputFormat};

#[derive(Serialize, Tabled)]
struct EntityRow {
    #[tabled(rename = "Type")]
    entity_type: String,
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
}

#[derive(Serialize, Tabled)]
struct InstanceRow {
    #[tabled(rename = "Type")]
    entity_type: String,
    #[tabled(rename = "Entity")]
    entity_name: String,
    #[tabled(rename = "Id")]
    entity_id: String,
    #[tabled(rename = "Counter")]
    counter_id: i32,
    #[tabled(rename = "Instance")]
    instance: String,
}

/// List discoverable entities. Without a name this resolves the
/// requested types from the global root; with a name it pins the
/// `(type, name)` root entity down first and then enumerates every
/// entity type beneath it, the root included.
pub async fn list_entities(
    config: &SessionConfig,
    entity_types: &[String],
    entity_name: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let types = client::parse_entity_types(entity_types)?;

    let session = client::connect(config).await?;
    let result = match entity_name {
        Some(name) => {
            let selectors: Vec<RootSelector> = types
                .iter()
                .map(|t| RootSelector { entity_type: *t, name: name.to_string() })
                .collect();
            entities::resolve_all_under_roots(&session, &selectors).await
        }
        None => entities::resolve_under_roots(&session, None, &types).await,
    };
    session.close().await;

    let mut rows: Vec<EntityRow> = result?
        .into_iter()
        .map(|e| EntityRow {
            entity_type: e.entity_type.to_string(),
            id: e.id,
            name: e.name,
        })
        .collect();
    rows.sort_by(|a, b| (&a.entity_type, &a.id).cmp(&(&b.entity_type, &b.id)));

    if rows.is_empty() {
        if let Some(name) = entity_name {
            crate::output::print_warning(&format!("no entity named {name} matched"));
            return Ok(());
        }
    }

    print_table(&rows, format)
}

/// List every available counter instance on every discoverable entity.
pub async fn list_instances(
    config: &SessionConfig,
    entity_types: &[String],
    format: OutputFormat,
) -> Result<()> {
    let types = client::parse_entity_types(entity_types)?;

    let session = client::connect(config).await?;
    let result = pipeline::list_instances(&session, &types).await;
    session.close().await;

    let rows: Vec<InstanceRow> = result?
        .into_iter()
        .map(|i| InstanceRow {
            entity_type: i.entity_type.to_string(),
            entity_name: i.entity_name,
            entity_id: i.entity_id,
            counter_id: i.counter_id,
            instance: format_instance(&i.instance),
        })
        .collect();

    print_table(&rows, format)
}
