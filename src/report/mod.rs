//! CVE report rendering.
//!
//! - [`console`] - colored terminal report
//! - [`markdown`] - Jira-friendly markdown file
//!
//! Both are pure renderers over a slice of findings and a [`ReportContext`];
//! the `cves` command decides where the output goes.

pub mod console;
pub mod markdown;

use crate::cve::SeverityFilter;

/// What a report was generated for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportContext {
    /// Profile key, used in file names (e.g. `mgmt`)
    pub cluster_key: String,
    /// Human readable cluster name
    pub cluster_name: String,
    pub severity: SeverityFilter,
    /// Namespace filter; empty means every namespace
    pub namespaces: Vec<String>,
}

impl ReportContext {
    pub fn new(cluster_key: impl Into<String>, cluster_name: impl Into<String>, severity: SeverityFilter) -> Self {
        Self {
            cluster_key: cluster_key.into(),
            cluster_name: cluster_name.into(),
            severity,
            namespaces: Vec::new(),
        }
    }

    pub fn with_namespaces(mut self, namespaces: Vec<String>) -> Self {
        self.namespaces = namespaces;
        self
    }

    /// Namespace filter as typed on the command line, if any.
    pub fn namespace_filter(&self) -> Option<String> {
        (!self.namespaces.is_empty()).then(|| self.namespaces.join(","))
    }

    /// Severity filter in upper case, as shown in headings.
    pub fn severity_label(&self) -> String {
        self.severity.as_str().to_uppercase()
    }
}
