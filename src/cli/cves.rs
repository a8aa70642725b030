//! `clusterops cves`: Kubescape CVE report for one cluster.
//!
//! Prints a colored console report and, unless `--no-report` is given,
//! writes a Jira-ready markdown report next to it.
//!
//! ```bash
//! clusterops cves                      # all severities on the default cluster
//! clusterops cves critical workload1
//! clusterops cves high --namespace kommander,kube-system --output-dir reports/
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::common::{ClusterContext, parse_namespaces};
use crate::config::GlobalConfig;
use crate::constants::CVE_EXTRACTION_TIMEOUT;
use crate::core::OpsError;
use crate::cve::SeverityFilter;
use crate::kube::vulnerability::{CveExtraction, extract_cves};
use crate::report::ReportContext;
use crate::report::console::{header, render_findings, render_scan_banner};
use crate::report::markdown::write_markdown_report;
use crate::utils::spinner_with_message;

/// Scan a cluster's Kubescape results and report CVEs.
#[derive(Args, Debug)]
pub struct CvesCommand {
    /// Severity filter
    #[arg(value_enum, default_value_t = SeverityFilter::All)]
    severity: SeverityFilter,

    /// Cluster profile to scan (defaults to the configured default cluster)
    cluster: Option<String>,

    /// Only include workloads in these namespaces (comma separated or repeated)
    #[arg(short, long)]
    namespace: Vec<String>,

    /// Directory for the markdown report
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Skip the markdown report
    #[arg(long)]
    no_report: bool,
}

impl CvesCommand {
    pub async fn execute(self, config: &GlobalConfig) -> Result<()> {
        let cluster = ClusterContext::resolve(config, self.cluster.as_deref(), None)?;
        let context = ReportContext::new(&cluster.key, &cluster.display_name, self.severity)
            .with_namespaces(parse_namespaces(&self.namespace));

        print!("{}", render_scan_banner(&context, Some(&cluster.kubeconfig)));
        println!();

        let extraction = scan(&cluster, &context).await?;
        print!("{}", render_findings(&extraction.findings, &context));

        if !self.no_report {
            let generated = chrono::Local::now().naive_local();
            let path = write_markdown_report(&self.output_dir, &extraction.findings, &context, generated)?;
            println!("{} {}", "✓ Jira-formatted report saved to:".green(), path.display());
        }

        print!("{}", header("Report Complete"));
        Ok(())
    }
}

async fn scan(cluster: &ClusterContext, context: &ReportContext) -> Result<CveExtraction> {
    let spinner = spinner_with_message("Extracting CVEs from vulnerability manifests...");
    let result = tokio::time::timeout(
        CVE_EXTRACTION_TIMEOUT,
        extract_cves(&cluster.kubectl, context.severity, &context.namespaces, Some(&spinner)),
    )
    .await;
    spinner.finish_and_clear();

    match result {
        Ok(extraction) => extraction,
        Err(_) => Err(OpsError::Other {
            message: format!(
                "CVE extraction for {} timed out after {}s",
                cluster.display_name,
                CVE_EXTRACTION_TIMEOUT.as_secs()
            ),
        }
        .into()),
    }
}
