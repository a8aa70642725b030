//! Markdown block diagram of ClusterApp dependencies.
//!
//! [`BlockDiagram`] ties the graph pieces together: it builds the
//! [`AppGraph`] from records, finds the roots, partitions the apps into root
//! chains and orphans, and renders every app exactly once as a block (see
//! [`render_block`]) inside a fenced code section of a markdown document.
//!
//! # Examples
//!
//! ```rust
//! use clusterops_cli::diagram::BlockDiagram;
//! use clusterops_cli::graph::DependencyRecord;
//!
//! let records = vec![
//!     DependencyRecord::new("cert-manager-1.14.2", "N/A"),
//!     DependencyRecord::new("traefik-27.0.2", "cert-manager"),
//! ];
//! let document = BlockDiagram::new(&records).render();
//!
//! assert!(document.contains("### Root Chain 1: cert-manager-1.14.2"));
//! assert!(document.ends_with("```\n"));
//! ```

mod block;

pub use block::{BlockStyle, render_block};

use crate::graph::{AppGraph, ChainPartition, DependencyRecord, find_roots, partition_chains};

const TITLE: &str = "# ClusterApp Dependency Block Diagram";
const INTRO: &str = "This diagram shows each ClusterApp once as a block with its dependencies (parents) and dependents (children).";
const ROOT_NOTE: &str = "Root nodes (apps with no dependencies) are shown at the top of each chain.";
const SECTION: &str = "## Block Diagram";
const FENCE: &str = "```";
const ORPHAN_HEADER: &str = "### Orphaned Apps (not connected to any root)";
const RULE_WIDTH: usize = 80;

/// A dependency graph together with its root chains, ready to render.
#[derive(Debug)]
pub struct BlockDiagram {
    graph: AppGraph,
    roots: Vec<String>,
    partition: ChainPartition,
    style: BlockStyle,
}

impl BlockDiagram {
    /// Build the graph and chain partition from records.
    pub fn new<'a>(records: impl IntoIterator<Item = &'a DependencyRecord>) -> Self {
        let graph = AppGraph::from_records(records);
        let roots = find_roots(&graph);
        let partition = partition_chains(&graph, &roots);

        tracing::debug!(
            target: "graph",
            "Diagram has {} apps, {} roots, {} chains and {} orphans",
            graph.len(),
            roots.len(),
            partition.chains.len(),
            partition.orphans.len()
        );

        Self {
            graph,
            roots,
            partition,
            style: BlockStyle::default(),
        }
    }

    pub fn with_style(mut self, style: BlockStyle) -> Self {
        self.style = style;
        self
    }

    pub fn graph(&self) -> &AppGraph {
        &self.graph
    }

    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    pub fn partition(&self) -> &ChainPartition {
        &self.partition
    }

    /// Render the complete markdown document.
    ///
    /// The output depends only on the records the diagram was built from.
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = [TITLE, "", INTRO, ROOT_NOTE, "", SECTION, "", FENCE, ""]
            .into_iter()
            .map(str::to_string)
            .collect();

        for (index, chain) in self.partition.chains.iter().enumerate() {
            if index > 0 {
                push_rule(&mut lines);
            }
            lines.push(format!("### Root Chain {}: {}", index + 1, chain.root));
            lines.push(String::new());
            for app in &chain.members {
                self.push_block(&mut lines, app);
            }
        }

        if !self.partition.orphans.is_empty() {
            push_rule(&mut lines);
            lines.push(ORPHAN_HEADER.to_string());
            lines.push(String::new());
            for app in &self.partition.orphans {
                self.push_block(&mut lines, app);
            }
        }

        lines.push(FENCE.to_string());
        lines.push(String::new());
        lines.join("\n")
    }

    fn push_block(&self, lines: &mut Vec<String>, app: &str) {
        let children = self.graph.children(app);
        lines.extend(render_block(app, self.graph.parents(app), children.as_slice(), &self.style));
        lines.push(String::new());
    }
}

fn push_rule(lines: &mut Vec<String>) {
    lines.push(String::new());
    lines.push("─".repeat(RULE_WIDTH));
    lines.push(String::new());
}

/// Build and render a diagram in one step.
pub fn render_diagram(records: &[DependencyRecord]) -> String {
    BlockDiagram::new(records).render()
}
