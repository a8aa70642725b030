//! Building an [`AppGraph`] from ClusterApp dependency records.
//!
//! A record pairs an identifier with the free-text dependency annotation of
//! that ClusterApp. The text is empty, the `N/A` marker, or a comma separated
//! list of references. References name either an exact identifier or the
//! base name of one (see [`base_name`](super::base_name)).
//!
//! Resolution is first-match against the apps registered *so far*, scanned in
//! registration order. A reference to an app that appears later in the
//! listing, or to no app at all, forms no edge. Record order therefore shapes
//! the graph; callers that need a stable diagram must feed a stable listing.

use std::fmt;

use super::AppGraph;
use crate::constants::NOT_APPLICABLE_MARKER;

/// One `(identifier, dependency text)` pair from a ClusterApp listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRecord {
    /// ClusterApp name, possibly version suffixed.
    pub identifier: String,
    /// Raw dependency annotation; `None` when the listing had no such field.
    pub dependencies: Option<String>,
}

impl DependencyRecord {
    /// Create a record with dependency text.
    pub fn new(identifier: impl Into<String>, dependencies: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            dependencies: Some(dependencies.into()),
        }
    }

    /// Create a record whose listing carried no dependency field.
    pub fn without_dependencies(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            dependencies: None,
        }
    }

    /// Parse one `<identifier>|<dependency text>` line.
    ///
    /// Blank lines and lines with an empty identifier yield `None`. A line
    /// without `|` is a record with no dependencies. Fields after a second
    /// `|` are ignored.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let mut fields = line.split('|');
        let identifier = fields.next().unwrap_or_default().trim();
        if identifier.is_empty() {
            return None;
        }

        Some(match fields.next() {
            Some(dependencies) => Self::new(identifier, dependencies.trim()),
            None => Self::without_dependencies(identifier),
        })
    }

    /// Dependency references with whitespace trimmed and empty entries dropped.
    pub fn references(&self) -> Vec<&str> {
        match self.dependencies.as_deref().map(str::trim) {
            None | Some("") => Vec::new(),
            Some(NOT_APPLICABLE_MARKER) => Vec::new(),
            Some(text) => text.split(',').map(str::trim).filter(|r| !r.is_empty()).collect(),
        }
    }
}

impl fmt::Display for DependencyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.identifier, self.dependencies.as_deref().unwrap_or_default())
    }
}

/// Parse the pipe-delimited record format, one record per line.
pub fn parse_record_lines(text: &str) -> Vec<DependencyRecord> {
    text.lines().filter_map(DependencyRecord::parse_line).collect()
}

/// Build the dependency graph from records, in order.
///
/// Every record registers its identifier; each of its references is matched
/// against registered apps (the record's own app included) and the first app
/// whose identifier or base name equals the reference gains the record's app
/// as a dependent.
pub fn parse_records<'a>(records: impl IntoIterator<Item = &'a DependencyRecord>) -> AppGraph {
    let mut graph = AppGraph::default();

    for record in records {
        let node = graph.register(&record.identifier);
        let references = record.references();

        for reference in &references {
            match graph.resolve(reference) {
                Some(dependency) => graph.add_dependency(node, dependency),
                None => tracing::debug!(
                    target: "graph",
                    "{} depends on '{}', which matches no app registered so far",
                    record.identifier,
                    reference
                ),
            }
        }

        graph.set_parents(node, references.into_iter().map(str::to_string).collect());
    }

    tracing::debug!(
        target: "graph",
        "Built dependency graph with {} apps and {} edges",
        graph.len(),
        graph.edge_count()
    );
    graph
}
