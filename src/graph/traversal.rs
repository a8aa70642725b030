//! Breadth-first partitioning of the graph into root chains and orphans.

use std::collections::{HashSet, VecDeque};

use super::AppGraph;

/// Apps reached from one root, in breadth-first discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    /// The root the walk started from; always the first member.
    pub root: String,
    pub members: Vec<String>,
}

impl Chain {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Every app of a graph, placed in exactly one chain or among the orphans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainPartition {
    pub chains: Vec<Chain>,
    /// Apps no root reaches, sorted.
    pub orphans: Vec<String>,
}

impl ChainPartition {
    /// All apps in output order: chain members first, then orphans.
    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.chains
            .iter()
            .flat_map(|chain| chain.members.iter())
            .chain(self.orphans.iter())
            .map(String::as_str)
    }
}

/// Walk state for a single [`partition_chains`] call.
struct TraversalContext<'g> {
    graph: &'g AppGraph,
    processed: HashSet<&'g str>,
}

impl<'g> TraversalContext<'g> {
    fn new(graph: &'g AppGraph) -> Self {
        Self {
            graph,
            processed: HashSet::with_capacity(graph.len()),
        }
    }

    /// Breadth-first walk over dependents starting at `root`.
    ///
    /// Returns `None` when `root` was already claimed by an earlier chain.
    fn walk(&mut self, root: &'g str) -> Option<Chain> {
        if self.processed.contains(root) {
            return None;
        }

        let mut members = Vec::new();
        let mut queue = VecDeque::from([root]);

        while let Some(current) = queue.pop_front() {
            if !self.processed.insert(current) {
                continue;
            }
            members.push(current.to_string());

            for child in self.graph.children(current) {
                if !self.processed.contains(child) && !queue.contains(&child) {
                    queue.push_back(child);
                }
            }
        }

        Some(Chain {
            root: root.to_string(),
            members,
        })
    }

    fn into_orphans(self) -> Vec<String> {
        let mut orphans: Vec<String> = self
            .graph
            .identifiers()
            .filter(|identifier| !self.processed.contains(identifier))
            .map(str::to_string)
            .collect();
        orphans.sort_unstable();
        orphans
    }
}

/// Split the graph into one chain per unclaimed root plus the orphan remainder.
///
/// Roots are walked in the order given. A root already reached from an
/// earlier root produces no chain of its own.
pub fn partition_chains(graph: &AppGraph, roots: &[String]) -> ChainPartition {
    let mut context = TraversalContext::new(graph);

    let chains: Vec<Chain> = roots
        .iter()
        .filter_map(|root| context.walk(root.as_str()))
        .collect();

    let orphans = context.into_orphans();
    if !orphans.is_empty() {
        tracing::debug!(target: "graph", "{} apps are not reachable from any root", orphans.len());
    }

    ChainPartition { chains, orphans }
}
