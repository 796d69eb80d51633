//! Wire-side data types exchanged with the remote inventory API
//!
//! These structs mirror the subset of the remote object model the pipeline
//! consumes: property retrieval filters with traversal select-sets, the
//! performance counter catalog, and performance query requests/results.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A typed reference to a remote managed object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub id: String,
}

impl ObjectRef {
    pub fn new(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self { entity_type: entity_type.into(), id: id.into() }
    }
}

/// One step of a traversal: follow `path` on objects of `entity_type`,
/// then continue with the nested select-set. Named so later steps can
/// reference it instead of re-expanding (which is what permits cycles).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub path: String,
    pub select_set: Vec<SelectSpec>,
}

/// Either a full traversal step or a by-name reference to one built
/// earlier in the same specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectSpec {
    Traversal(TraversalSpec),
    Reference { name: String },
}

impl SelectSpec {
    pub fn name(&self) -> &str {
        match self {
            SelectSpec::Traversal(t) => &t.name,
            SelectSpec::Reference { name } => name,
        }
    }
}

/// A starting object plus the traversal graph to walk from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSpec {
    pub obj: ObjectRef,
    /// Skip the starting object itself in the result set.
    pub skip: bool,
    pub select_set: Vec<SelectSpec>,
}

/// Which properties to return for which object type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySpec {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub path_set: Vec<String>,
}

/// One bulk retrieval request: objects to visit and properties to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyFilterSpec {
    pub object_set: Vec<ObjectSpec>,
    pub prop_set: Vec<PropertySpec>,
}

/// One raw retrieval record: an object reference plus the fetched
/// properties as a flat path-to-value map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectContent {
    pub obj: ObjectRef,
    #[serde(default)]
    pub props: HashMap<String, String>,
}

/// A raw counter catalog record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerfCounterDesc {
    pub key: i32,
    pub group: String,
    pub name: String,
    pub summary: String,
    pub rollup: String,
    pub stats: String,
    pub unit: String,
}

/// A historical rollup period configured on the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerfInterval {
    pub sampling_period: i32,
}

/// Per-entity sampling capabilities reported by the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSummary {
    pub current_supported: bool,
    pub summary_supported: bool,
    pub refresh_rate: i32,
}

/// A counter/instance pair available (or requested) for one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerfMetricId {
    pub counter_id: i32,
    #[serde(default)]
    pub instance: String,
}

/// A bounded performance query for one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerfQuerySpec {
    pub entity: ObjectRef,
    pub interval_id: i32,
    pub metric_ids: Vec<PerfMetricId>,
    /// 0 means "most recent sample only" on live intervals; the endpoint
    /// ignores it for historical rollups.
    pub max_samples: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
}

/// Timestamp/interval pair for one returned sample position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerfSampleInfo {
    pub timestamp: DateTime<Utc>,
    pub interval: i32,
}

/// One returned value series: a counter/instance pair with one value per
/// sample position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerfSeries {
    pub id: PerfMetricId,
    pub values: Vec<i64>,
}

/// All series returned for one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetrics {
    pub entity: ObjectRef,
    pub sample_info: Vec<PerfSampleInfo>,
    pub series: Vec<PerfSeries>,
}
