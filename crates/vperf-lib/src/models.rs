//! Core data model: inventory entities, performance counters, metrics

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::VimError;
use crate::vim::types::ObjectRef;

/// Closed set of inventory object kinds understood by the exporter.
///
/// The remote API identifies objects by these type strings; serde uses the
/// same strings so the enum round-trips through config files and the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ManagedEntityType {
    ClusterComputeResource,
    ComputeResource,
    Datacenter,
    Datastore,
    DistributedVirtualPortgroup,
    DistributedVirtualSwitch,
    Folder,
    HostSystem,
    Network,
    OpaqueNetwork,
    ResourcePool,
    StoragePod,
    VirtualApp,
    VirtualMachine,
    VmwareDistributedVirtualSwitch,
}

impl ManagedEntityType {
    /// All entity types, in wire-name order.
    pub fn values() -> &'static [ManagedEntityType] {
        use ManagedEntityType::*;
        &[
            ClusterComputeResource,
            ComputeResource,
            Datacenter,
            Datastore,
            DistributedVirtualPortgroup,
            DistributedVirtualSwitch,
            Folder,
            HostSystem,
            Network,
            OpaqueNetwork,
            ResourcePool,
            StoragePod,
            VirtualApp,
            VirtualMachine,
            VmwareDistributedVirtualSwitch,
        ]
    }

    /// The type string used by the remote API.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::ClusterComputeResource => "ClusterComputeResource",
            Self::ComputeResource => "ComputeResource",
            Self::Datacenter => "Datacenter",
            Self::Datastore => "Datastore",
            Self::DistributedVirtualPortgroup => "DistributedVirtualPortgroup",
            Self::DistributedVirtualSwitch => "DistributedVirtualSwitch",
            Self::Folder => "Folder",
            Self::HostSystem => "HostSystem",
            Self::Network => "Network",
            Self::OpaqueNetwork => "OpaqueNetwork",
            Self::ResourcePool => "ResourcePool",
            Self::StoragePod => "StoragePod",
            Self::VirtualApp => "VirtualApp",
            Self::VirtualMachine => "VirtualMachine",
            Self::VmwareDistributedVirtualSwitch => "VmwareDistributedVirtualSwitch",
        }
    }

    /// Network-like types carry a stale or empty generic name; their real
    /// name must be re-read from the type-specific summary property.
    pub fn needs_name_override(&self) -> bool {
        matches!(
            self,
            Self::DistributedVirtualPortgroup | Self::Network | Self::OpaqueNetwork
        )
    }
}

impl fmt::Display for ManagedEntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for ManagedEntityType {
    type Err = VimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::values()
            .iter()
            .find(|t| t.wire_name() == s)
            .copied()
            .ok_or_else(|| VimError::UnknownEntityType(s.to_string()))
    }
}

/// A resolved inventory object. Identity is `(entity_type, id)`; instances
/// live for a single scrape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub name: String,
    pub entity_type: ManagedEntityType,
}

impl Entity {
    /// The wire reference for this entity.
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(self.entity_type.wire_name(), self.id.clone())
    }
}

/// A performance counter definition from the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterInfo {
    pub id: i32,
    pub group: String,
    pub name: String,
    pub name_summary: String,
    pub rollup: String,
    pub stats: String,
    pub unit: String,
}

/// Key used to select counters in configuration. Counter ids are not stable
/// across endpoints, so configured counters are matched semantically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSelector {
    pub group: String,
    pub name: String,
    pub rollup: String,
}

/// The counter catalog loaded once per scrape.
#[derive(Debug, Clone, Default)]
pub struct CounterCatalog {
    counters: Vec<CounterInfo>,
}

impl CounterCatalog {
    pub fn new(counters: Vec<CounterInfo>) -> Self {
        Self { counters }
    }

    pub fn counters(&self) -> &[CounterInfo] {
        &self.counters
    }

    pub fn find_by_id(&self, id: i32) -> Option<&CounterInfo> {
        self.counters.iter().find(|c| c.id == id)
    }

    /// Resolve a configured counter key to its catalog entry.
    pub fn resolve(&self, sel: &CounterSelector) -> Option<&CounterInfo> {
        self.counters.iter().find(|c| {
            c.group == sel.group && c.name == sel.name && c.rollup == sel.rollup
        })
    }

    /// Resolve the configured selection against this catalog, dropping
    /// selectors the endpoint does not know.
    pub fn complement(&self, selectors: &[CounterSelector]) -> Vec<CounterInfo> {
        selectors
            .iter()
            .filter_map(|sel| {
                let found = self.resolve(sel);
                if found.is_none() {
                    tracing::warn!(
                        group = %sel.group,
                        name = %sel.name,
                        rollup = %sel.rollup,
                        "configured counter not present in catalog"
                    );
                }
                found.cloned()
            })
            .collect()
    }
}

/// Sampling interval chosen for one entity type.
///
/// `id == 0` is the sentinel for "neither live sampling nor historical
/// rollups are supported".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalChoice {
    pub id: i32,
    pub current: bool,
}

impl IntervalChoice {
    pub const UNSUPPORTED: IntervalChoice = IntervalChoice { id: 0, current: true };

    pub fn is_usable(&self) -> bool {
        self.id != 0
    }
}

/// A single decoded observation, produced fresh on every scrape.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub entity: Entity,
    pub counter: CounterInfo,
    pub instance: String,
    pub timestamp: DateTime<Utc>,
    pub value: i64,
    pub interval: i32,
}
