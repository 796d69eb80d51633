//! Traversal specification builder
//!
//! The remote inventory is a graph of typed objects connected by named
//! reference properties, and the graph is cyclic (folders contain folders,
//! resource pools contain resource pools, every entity has a parent). A
//! retrieval call therefore takes a declarative traversal specification:
//! for each object type, which properties to follow and how to continue
//! from what they reach.
//!
//! The builder expands a fixed per-type edge table recursively. Every step
//! gets a name derived from `(type, path)`; the first time a step is built
//! it is recorded in the builder's cache *before* its nested select-set is
//! expanded, and any later request for the same step emits a by-name
//! reference instead of a new expansion. That reference is what terminates
//! recursion on cyclic edges.
//!
//! The edge tables are fixed domain knowledge about the remote object
//! model; the match over [`ManagedEntityType`] is exhaustive, so an
//! unsupported type cannot reach this module at runtime.

use std::collections::HashSet;

use crate::models::ManagedEntityType;
use crate::vim::types::{ObjectRef, ObjectSpec, SelectSpec, TraversalSpec};

/// Walk direction for a traversal specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraverseDirection {
    /// Fan out across the container hierarchy below the root.
    Descendants,
    /// Linear walk up the parent chain (plus a few type-specific edges).
    Ancestors,
}

/// Build the object spec for one root: the starting reference, whether to
/// include the root itself in the result set, and the full select-set for
/// the chosen direction.
pub fn build(
    obj: ObjectRef,
    entity_type: ManagedEntityType,
    direction: TraverseDirection,
    include_self: bool,
) -> ObjectSpec {
    let mut builder = SpecBuilder::new();
    let select_set = match direction {
        TraverseDirection::Descendants => descendant_edges(entity_type, &mut builder),
        TraverseDirection::Ancestors => ancestor_edges(entity_type, &mut builder),
    };

    ObjectSpec { obj, skip: !include_self, select_set }
}

/// Descendant walk from `root`.
pub fn descendants(root: ObjectRef, entity_type: ManagedEntityType, include_self: bool) -> ObjectSpec {
    build(root, entity_type, TraverseDirection::Descendants, include_self)
}

/// Ancestor walk from `root`.
pub fn ancestors(root: ObjectRef, entity_type: ManagedEntityType, include_self: bool) -> ObjectSpec {
    build(root, entity_type, TraverseDirection::Ancestors, include_self)
}

/// Memoizing builder for one specification.
///
/// The cache is scoped to a single [`build`] call: a specification is
/// self-contained, so references only ever point at steps built within it.
struct SpecBuilder {
    built: HashSet<String>,
}

type EdgeFn = fn(&mut SpecBuilder) -> Vec<SelectSpec>;

impl SpecBuilder {
    fn new() -> Self {
        Self { built: HashSet::new() }
    }

    /// One traversal step. Marks the name as built before expanding the
    /// nested select-set; re-entrant requests for the same `(type, path)`
    /// come back as references.
    fn step(&mut self, entity_type: &'static str, path: &'static str, expand: EdgeFn) -> SelectSpec {
        let name = format!("{entity_type}Spec{path}");
        if !self.built.insert(name.clone()) {
            return SelectSpec::Reference { name };
        }

        let select_set = expand(self);
        SelectSpec::Traversal(TraversalSpec {
            name,
            entity_type: entity_type.to_string(),
            path: path.to_string(),
            select_set,
        })
    }

    /// A terminal edge: follow the property, recurse no further.
    fn leaf(&mut self, entity_type: &'static str, path: &'static str) -> SelectSpec {
        self.step(entity_type, path, |_| Vec::new())
    }
}

fn descendant_edges(entity_type: ManagedEntityType, b: &mut SpecBuilder) -> Vec<SelectSpec> {
    use ManagedEntityType::*;
    match entity_type {
        ClusterComputeResource | ComputeResource => compute_resource_lower(b),
        Datacenter => datacenter_lower(b),
        Datastore => datastore_lower(b),
        DistributedVirtualSwitch | VmwareDistributedVirtualSwitch => dvs_lower(b),
        Folder | StoragePod => folder_lower(b),
        HostSystem => host_system_lower(b),
        Network | OpaqueNetwork | DistributedVirtualPortgroup => network_lower(b),
        ResourcePool | VirtualApp => resource_pool_lower(b),
        VirtualMachine => Vec::new(),
    }
}

fn ancestor_edges(entity_type: ManagedEntityType, b: &mut SpecBuilder) -> Vec<SelectSpec> {
    use ManagedEntityType::*;
    let mut edges = managed_entity_upper(b);
    match entity_type {
        Datastore => edges.extend(datastore_upper(b)),
        Network | OpaqueNetwork | DistributedVirtualPortgroup => edges.extend(network_upper(b)),
        VirtualMachine => edges.extend(virtual_machine_upper(b)),
        _ => {}
    }

    edges
}

fn compute_resource_lower(b: &mut SpecBuilder) -> Vec<SelectSpec> {
    vec![
        b.step("ComputeResource", "datastore", datastore_lower),
        b.step("ComputeResource", "host", host_system_lower),
        b.step("ComputeResource", "network", network_lower),
        b.step("ComputeResource", "resourcePool", resource_pool_lower),
    ]
}

fn datacenter_lower(b: &mut SpecBuilder) -> Vec<SelectSpec> {
    vec![
        b.step("Datacenter", "datastoreFolder", folder_lower),
        b.step("Datacenter", "hostFolder", folder_lower),
        b.step("Datacenter", "networkFolder", folder_lower),
        b.step("Datacenter", "vmFolder", folder_lower),
    ]
}

fn datastore_lower(b: &mut SpecBuilder) -> Vec<SelectSpec> {
    vec![b.leaf("Datastore", "vm")]
}

fn datastore_upper(b: &mut SpecBuilder) -> Vec<SelectSpec> {
    vec![b.leaf("Datastore", "host")]
}

fn dvs_lower(b: &mut SpecBuilder) -> Vec<SelectSpec> {
    vec![b.step("DistributedVirtualSwitch", "portgroup", network_lower)]
}

/// A folder's children can be any container type, each of which may reach
/// folders again; the childEntity step is the main cycle in the model.
fn folder_lower(b: &mut SpecBuilder) -> Vec<SelectSpec> {
    fn child_edges(b: &mut SpecBuilder) -> Vec<SelectSpec> {
        let mut edges = Vec::new();
        edges.extend(folder_lower(b));
        edges.extend(compute_resource_lower(b));
        edges.extend(datacenter_lower(b));
        edges.extend(datastore_lower(b));
        edges.extend(dvs_lower(b));
        edges.extend(network_lower(b));
        edges
    }

    vec![b.step("Folder", "childEntity", child_edges)]
}

fn host_system_lower(b: &mut SpecBuilder) -> Vec<SelectSpec> {
    vec![
        b.step("HostSystem", "datastore", datastore_lower),
        b.step("HostSystem", "network", network_lower),
        b.leaf("HostSystem", "vm"),
    ]
}

/// The parent chain every entity type shares; self-referential by design.
fn managed_entity_upper(b: &mut SpecBuilder) -> Vec<SelectSpec> {
    vec![b.step("ManagedEntity", "parent", managed_entity_upper)]
}

fn network_lower(b: &mut SpecBuilder) -> Vec<SelectSpec> {
    vec![b.leaf("Network", "vm")]
}

fn network_upper(b: &mut SpecBuilder) -> Vec<SelectSpec> {
    vec![
        b.leaf("Network", "host"),
        b.leaf("DistributedVirtualPortgroup", "config.distributedVirtualSwitch"),
    ]
}

fn resource_pool_lower(b: &mut SpecBuilder) -> Vec<SelectSpec> {
    vec![
        b.step("ResourcePool", "resourcePool", resource_pool_lower),
        b.leaf("ResourcePool", "vm"),
    ]
}

fn virtual_machine_upper(b: &mut SpecBuilder) -> Vec<SelectSpec> {
    vec![
        b.step("VirtualMachine", "datastore", datastore_upper),
        b.step("VirtualMachine", "network", network_upper),
        b.leaf("VirtualMachine", "parentVApp"),
        b.leaf("VirtualMachine", "resourcePool"),
        b.leaf("VirtualMachine", "runtime.host"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Collect the names of all fully-expanded traversal steps in a tree.
    fn traversal_names(set: &[SelectSpec], out: &mut Vec<String>) {
        for spec in set {
            if let SelectSpec::Traversal(t) = spec {
                out.push(t.name.clone());
                traversal_names(&t.select_set, out);
            }
        }
    }

    /// Collect the names of all by-name references in a tree.
    fn reference_names(set: &[SelectSpec], out: &mut Vec<String>) {
        for spec in set {
            match spec {
                SelectSpec::Traversal(t) => reference_names(&t.select_set, out),
                SelectSpec::Reference { name } => out.push(name.clone()),
            }
        }
    }

    fn folder_root() -> ObjectRef {
        ObjectRef::new("Folder", "group-d1")
    }

    #[test]
    fn every_step_is_expanded_exactly_once() {
        let spec = descendants(folder_root(), ManagedEntityType::Folder, false);

        let mut names = Vec::new();
        traversal_names(&spec.select_set, &mut names);
        let mut deduped = names.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(names.len(), deduped.len(), "duplicate expansion: {names:?}");
    }

    #[test]
    fn references_only_point_at_expanded_steps() {
        let spec = descendants(folder_root(), ManagedEntityType::Folder, false);

        let mut names = Vec::new();
        traversal_names(&spec.select_set, &mut names);
        let mut refs = Vec::new();
        reference_names(&spec.select_set, &mut refs);

        assert!(!refs.is_empty());
        for r in &refs {
            assert!(names.contains(r), "dangling reference {r}");
        }
    }

    #[test]
    fn folder_cycle_becomes_a_self_reference() {
        let spec = descendants(folder_root(), ManagedEntityType::Folder, false);

        // The outer childEntity step is expanded once...
        let SelectSpec::Traversal(child) = &spec.select_set[0] else {
            panic!("expected expanded childEntity step");
        };
        assert_eq!(child.name, "FolderSpecchildEntity");
        assert_eq!(child.path, "childEntity");

        // ...and the folder edge inside it comes back as a reference.
        assert_eq!(
            child.select_set[0],
            SelectSpec::Reference { name: "FolderSpecchildEntity".to_string() }
        );
    }

    #[test]
    fn step_names_are_keyed_by_type_and_path() {
        let spec = descendants(
            ObjectRef::new("Datacenter", "datacenter-2"),
            ManagedEntityType::Datacenter,
            false,
        );

        let mut names = Vec::new();
        traversal_names(&spec.select_set, &mut names);
        assert!(names.contains(&"DatacenterSpecdatastoreFolder".to_string()));
        assert!(names.contains(&"DatacenterSpecvmFolder".to_string()));
        assert!(names.contains(&"FolderSpecchildEntity".to_string()));
    }

    #[test]
    fn virtual_machine_has_no_descendant_edges() {
        let spec = descendants(
            ObjectRef::new("VirtualMachine", "vm-10"),
            ManagedEntityType::VirtualMachine,
            true,
        );
        assert!(spec.select_set.is_empty());
        assert!(!spec.skip);
    }

    #[test]
    fn subclass_types_reuse_base_edge_sets() {
        let cluster = descendants(
            ObjectRef::new("ClusterComputeResource", "domain-c7"),
            ManagedEntityType::ClusterComputeResource,
            false,
        );
        let compute = descendants(
            ObjectRef::new("ComputeResource", "domain-s8"),
            ManagedEntityType::ComputeResource,
            false,
        );
        assert_eq!(cluster.select_set, compute.select_set);
    }

    #[test]
    fn ancestor_walk_is_a_self_referential_parent_chain() {
        let spec = ancestors(
            ObjectRef::new("HostSystem", "host-42"),
            ManagedEntityType::HostSystem,
            false,
        );

        assert_eq!(spec.select_set.len(), 1);
        let SelectSpec::Traversal(parent) = &spec.select_set[0] else {
            panic!("expected expanded parent step");
        };
        assert_eq!(parent.name, "ManagedEntitySpecparent");
        assert_eq!(parent.path, "parent");
        assert_eq!(
            parent.select_set,
            vec![SelectSpec::Reference { name: "ManagedEntitySpecparent".to_string() }]
        );
    }

    #[test]
    fn virtual_machine_ancestors_add_type_specific_edges() {
        let spec = ancestors(
            ObjectRef::new("VirtualMachine", "vm-10"),
            ManagedEntityType::VirtualMachine,
            false,
        );

        let paths: Vec<&str> = spec
            .select_set
            .iter()
            .filter_map(|s| match s {
                SelectSpec::Traversal(t) => Some(t.path.as_str()),
                SelectSpec::Reference { .. } => None,
            })
            .collect();
        assert_eq!(
            paths,
            vec!["parent", "datastore", "network", "parentVApp", "resourcePool", "runtime.host"]
        );
    }

    #[test]
    fn include_self_controls_the_skip_flag() {
        let with = descendants(folder_root(), ManagedEntityType::Folder, true);
        let without = descendants(folder_root(), ManagedEntityType::Folder, false);
        assert!(!with.skip);
        assert!(without.skip);
    }
}
