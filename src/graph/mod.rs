//! ClusterApp dependency graph.
//!
//! This module turns the dependency annotations of a point-in-time ClusterApp
//! listing into a directed graph and provides the algorithms the block diagram
//! is built from:
//!
//! - [`base_name`] strips version suffixes so `cert-manager-1.14.2` and the
//!   reference `cert-manager` name the same application family
//! - [`parse_records`] builds an [`AppGraph`] from `(identifier, dependency text)` records
//! - [`find_roots`] lists apps that declare no dependencies
//! - [`partition_chains`] walks dependents breadth-first from every root and
//!   splits the graph into chains plus a set of orphans
//!
//! The graph is built once and never mutated afterwards. Every query that
//! returns a set returns it sorted, so anything rendered from the graph is
//! deterministic.

mod name;
mod parser;
mod roots;
mod traversal;

pub use name::base_name;
pub use parser::{DependencyRecord, parse_record_lines, parse_records};
pub use roots::find_roots;
pub use traversal::{Chain, ChainPartition, partition_chains};

use petgraph::Direction;
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// One registered application and the dependency references it declared.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AppNode {
    identifier: String,
    /// Raw references from the annotation, resolved or not.
    parents: Vec<String>,
}

/// Dependency graph of ClusterApps.
///
/// Nodes are identifiers in registration order. An edge `a -> b` means `a`
/// depends on `b`; the dependents ("children") of `b` are therefore its
/// incoming neighbours. Declared references are kept verbatim even when they
/// resolve to no registered app.
#[derive(Debug, Default)]
pub struct AppGraph {
    graph: DiGraph<AppNode, ()>,
    node_map: HashMap<String, NodeIndex>,
}

impl AppGraph {
    /// Build a graph from records. See [`parse_records`].
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a DependencyRecord>) -> Self {
        parse_records(records)
    }

    /// Register an identifier with an empty parent list.
    ///
    /// A repeated identifier keeps its original node (and registration
    /// position) and has its parent list cleared.
    fn register(&mut self, identifier: &str) -> NodeIndex {
        if let Some(&index) = self.node_map.get(identifier) {
            self.graph[index].parents.clear();
            index
        } else {
            let index = self.graph.add_node(AppNode {
                identifier: identifier.to_string(),
                parents: Vec::new(),
            });
            self.node_map.insert(identifier.to_string(), index);
            index
        }
    }

    fn set_parents(&mut self, node: NodeIndex, parents: Vec<String>) {
        self.graph[node].parents = parents;
    }

    /// Record that `dependent` depends on `dependency`.
    fn add_dependency(&mut self, dependent: NodeIndex, dependency: NodeIndex) {
        if !self.graph.contains_edge(dependent, dependency) {
            self.graph.add_edge(dependent, dependency, ());
        }
    }

    /// First registered node whose identifier or base name equals `reference`.
    fn resolve(&self, reference: &str) -> Option<NodeIndex> {
        // Node indices are handed out in insertion order, so this scan follows
        // registration order.
        self.graph.node_indices().find(|&index| {
            let identifier = self.graph[index].identifier.as_str();
            base_name(identifier) == reference || identifier == reference
        })
    }

    /// Identifiers in registration order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(|node| node.identifier.as_str())
    }

    /// Whether `identifier` is registered.
    pub fn contains(&self, identifier: &str) -> bool {
        self.node_map.contains_key(identifier)
    }

    /// Number of registered applications.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether no application is registered.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Number of resolved dependency edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Dependency references declared by `identifier`, in annotation order.
    ///
    /// Unknown identifiers have no parents.
    pub fn parents(&self, identifier: &str) -> &[String] {
        self.node_map
            .get(identifier)
            .map(|&index| self.graph[index].parents.as_slice())
            .unwrap_or(&[])
    }

    /// Apps that depend on `identifier`, sorted.
    pub fn children(&self, identifier: &str) -> Vec<&str> {
        let Some(&index) = self.node_map.get(identifier) else {
            return Vec::new();
        };
        let mut children: Vec<&str> = self
            .graph
            .neighbors_directed(index, Direction::Incoming)
            .map(|child| self.graph[child].identifier.as_str())
            .collect();
        children.sort_unstable();
        children
    }

    /// Whether the resolved edges contain a dependency cycle.
    ///
    /// Apps on a cycle with no zero-dependency entry point end up as orphans.
    pub fn has_cycle(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }
}
