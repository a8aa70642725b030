//! clusterops - operator tooling for Kubernetes clusters
//!
//! Two jobs, both driven through `kubectl` and the kubeconfigs of named
//! cluster profiles:
//!
//! - **ClusterApp block diagram**: the dependency annotations of every
//!   ClusterApp are parsed into a graph, split into chains reachable from
//!   apps without dependencies, and rendered as a markdown document with one
//!   box per app listing its parents and children.
//! - **CVE reports**: Kubescape VulnerabilityManifestSummary and
//!   VulnerabilityManifest resources are read, findings are filtered by
//!   severity and namespace and deduplicated, then reported on the console,
//!   as a Jira-ready markdown file, or as JSON.
//!
//! # Modules
//!
//! - [`cli`] - clap commands (`diagram`, `cves`, `extract-cves`)
//! - [`config`] - global config with cluster profiles (`~/.clusterops/config.toml`)
//! - [`core`] - error types and user-facing error formatting
//! - [`graph`] - dependency records, graph construction, roots and chains
//! - [`diagram`] - block rendering of the graph
//! - [`kube`] - kubectl command builder and resource fetchers
//! - [`cve`] - severity filtering, findings and counts
//! - [`report`] - console and markdown CVE reports
//! - [`utils`] - paths, atomic writes and progress indicators
//!
//! # Example
//!
//! ```rust
//! use clusterops_cli::diagram::render_diagram;
//! use clusterops_cli::graph::parse_record_lines;
//!
//! let records = parse_record_lines("cert-manager-1.14.2|N/A\ntraefik-27.0.2|cert-manager\n");
//! let document = render_diagram(&records);
//! assert!(document.contains("Root Chain 1: cert-manager-1.14.2"));
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod cve;
pub mod diagram;
pub mod graph;
pub mod kube;
pub mod report;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
