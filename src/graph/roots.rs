use super::AppGraph;

/// Apps that declare no dependencies, sorted.
///
/// An app whose references all failed to resolve is not a root: it still
/// declared dependencies.
pub fn find_roots(graph: &AppGraph) -> Vec<String> {
    let mut roots: Vec<String> = graph
        .identifiers()
        .filter(|identifier| graph.parents(identifier).is_empty())
        .map(str::to_string)
        .collect();
    roots.sort_unstable();
    roots
}
