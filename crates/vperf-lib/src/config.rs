//! Scrape-selection configuration
//!
//! A YAML document describing which inventory roots to walk, which entity
//! types to collect, and which counters to publish. Missing sections fall
//! back to documented defaults; a malformed document is a startup error.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::VimError;
use crate::models::{CounterSelector, ManagedEntityType};

/// A configured inventory root, matched by `(type, name)`.
///
/// The pair `(Folder, "")` is the universal root marker: discover
/// everything from the global root, unfiltered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootSelector {
    #[serde(rename = "type")]
    pub entity_type: ManagedEntityType,
    pub name: String,
}

impl RootSelector {
    pub fn is_universal(&self) -> bool {
        self.entity_type == ManagedEntityType::Folder && self.name.is_empty()
    }
}

/// A configured entity type to collect metrics for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSelector {
    #[serde(rename = "type")]
    pub entity_type: ManagedEntityType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExporterConfig {
    #[serde(default = "default_counters")]
    pub counters: Vec<CounterSelector>,
    #[serde(default = "default_objects")]
    pub objects: Vec<ObjectSelector>,
    #[serde(default = "default_roots")]
    pub roots: Vec<RootSelector>,
}

fn default_counters() -> Vec<CounterSelector> {
    [
        ("cpu", "usage", "average"),
        ("cpu", "usagemhz", "average"),
        ("mem", "usage", "average"),
    ]
    .iter()
    .map(|(group, name, rollup)| CounterSelector {
        group: group.to_string(),
        name: name.to_string(),
        rollup: rollup.to_string(),
    })
    .collect()
}

fn default_objects() -> Vec<ObjectSelector> {
    vec![
        ObjectSelector { entity_type: ManagedEntityType::HostSystem },
        ObjectSelector { entity_type: ManagedEntityType::VirtualMachine },
    ]
}

fn default_roots() -> Vec<RootSelector> {
    vec![RootSelector {
        entity_type: ManagedEntityType::Folder,
        name: String::new(),
    }]
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            counters: default_counters(),
            objects: default_objects(),
            roots: default_roots(),
        }
    }
}

impl ExporterConfig {
    pub fn decode(doc: &str) -> Result<Self, VimError> {
        Ok(serde_yaml::from_str(doc)?)
    }

    pub fn encode(&self) -> Result<String, VimError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, VimError> {
        let data = std::fs::read_to_string(path)?;
        Self::decode(&data)
    }

    /// Load the file at `path`, or the defaults when no path is given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, VimError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Entity types to collect, in configured order.
    pub fn object_types(&self) -> Vec<ManagedEntityType> {
        self.objects.iter().map(|o| o.entity_type).collect()
    }
}
