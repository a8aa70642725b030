//! `clusterops extract-cves`: machine-readable CVE findings.
//!
//! Prints a pretty JSON array of findings on stdout and nothing else, so the
//! output can be piped into `jq` or other tooling. Diagnostics go to stderr.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use super::common::{ClusterContext, parse_namespaces};
use crate::config::GlobalConfig;
use crate::cve::{CveFinding, SeverityFilter};
use crate::kube::vulnerability::extract_cves;

/// Extract deduplicated CVE findings as JSON.
#[derive(Args, Debug)]
pub struct ExtractCommand {
    /// Severity filter
    #[arg(long, value_enum)]
    severity: SeverityFilter,

    /// Only include workloads in these namespaces (comma separated or repeated)
    #[arg(short, long)]
    namespace: Vec<String>,

    /// Kubeconfig to use instead of the profile's
    #[arg(long)]
    kubeconfig: Option<PathBuf>,

    /// Cluster profile to scan
    #[arg(long)]
    cluster: Option<String>,
}

impl ExtractCommand {
    pub async fn execute(self, config: &GlobalConfig) -> Result<()> {
        let cluster = ClusterContext::resolve(config, self.cluster.as_deref(), self.kubeconfig.as_deref())?;
        let namespaces = parse_namespaces(&self.namespace);

        let extraction = extract_cves(&cluster.kubectl, self.severity, &namespaces, None).await?;
        println!("{}", findings_json(&extraction.findings)?);
        Ok(())
    }
}

/// Pretty JSON array of findings; `[]` when there are none.
pub fn findings_json(findings: &[CveFinding]) -> Result<String> {
    serde_json::to_string_pretty(findings).context("Failed to serialize CVE findings")
}
