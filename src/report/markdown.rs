//! Jira-friendly markdown report.
//!
//! The report is named
//! `kubescape-cve-report-<cluster>-<severity>[-ns-<namespaces>]-<YYYYmmdd-HHMMSS>.md`
//! and contains a summary table followed by one table per severity.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::fmt;
use std::path::{Path, PathBuf};

use super::ReportContext;
use crate::cve::{CveFinding, SeverityCounts, SeverityLevel, findings_at};
use crate::utils::fs::atomic_write;

/// File name for a report generated at `generated`.
pub fn report_file_name(context: &ReportContext, generated: NaiveDateTime) -> String {
    let mut suffix = format!("{}-{}", context.cluster_key, context.severity);
    if !context.namespaces.is_empty() {
        suffix.push_str(&format!("-ns-{}", context.namespaces.join("-")));
    }
    format!("kubescape-cve-report-{suffix}-{}.md", generated.format("%Y%m%d-%H%M%S"))
}

fn emoji(level: SeverityLevel) -> &'static str {
    match level {
        SeverityLevel::Critical => "🔴",
        SeverityLevel::High => "🟠",
        SeverityLevel::Medium => "🟡",
        SeverityLevel::Low => "🟢",
    }
}

fn title_case(level: SeverityLevel) -> &'static str {
    match level {
        SeverityLevel::Critical => "Critical",
        SeverityLevel::High => "High",
        SeverityLevel::Medium => "Medium",
        SeverityLevel::Low => "Low",
    }
}

/// Escape characters that would break a table cell.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Render the report document.
pub fn render_markdown_report(findings: &[CveFinding], context: &ReportContext, generated: NaiveDateTime) -> String {
    MarkdownReport {
        findings,
        context,
        generated,
    }
    .to_string()
}

struct MarkdownReport<'a> {
    findings: &'a [CveFinding],
    context: &'a ReportContext,
    generated: NaiveDateTime,
}

impl MarkdownReport<'_> {
    fn write_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts = SeverityCounts::from_findings(self.findings, self.context.severity);
        writeln!(f, "| Severity | Count |")?;
        writeln!(f, "|----------|-------|")?;
        for level in SeverityLevel::ALL {
            writeln!(f, "| {} {} | {} |", emoji(level), title_case(level), counts.get(level))?;
        }
        writeln!(f, "\n---\n")
    }

    fn write_details(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## Detailed Findings\n")?;
        for level in SeverityLevel::ALL {
            if !self.context.severity.shows(level) {
                continue;
            }
            let at_level = findings_at(self.findings, level);
            if at_level.is_empty() {
                continue;
            }

            writeln!(f, "### {} Severity CVEs\n", level.as_str().to_uppercase())?;
            writeln!(f, "| CVE ID | Component | Namespace | Image | Fixed Version | Description |")?;
            writeln!(f, "|--------|-----------|-----------|-------|--------------|-------------|")?;
            for finding in at_level {
                writeln!(
                    f,
                    "| {} | {} | {} | {} | {} | {} |",
                    finding.cve,
                    finding.component,
                    finding.namespace,
                    finding.image,
                    finding.fixed_version,
                    escape_cell(&finding.description)
                )?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for MarkdownReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let context = self.context;
        writeln!(f, "# Kubescape CVE Report\n")?;
        writeln!(f, "**Cluster:** {}", context.cluster_name)?;
        writeln!(f, "**Severity Filter:** {}", context.severity_label())?;
        if let Some(namespaces) = context.namespace_filter() {
            writeln!(f, "**Namespace Filter:** {namespaces}")?;
        }
        writeln!(f, "**Generated:** {}\n", self.generated.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(f, "---\n")?;

        writeln!(f, "## Summary\n")?;
        if self.findings.is_empty() {
            writeln!(f, "✅ No CVEs found matching severity filter: `{}`\n", context.severity)?;
        } else {
            self.write_summary(f)?;
            self.write_details(f)?;
        }

        writeln!(f, "---\n")?;
        writeln!(f, "*Report generated by kubescape CVE scanner*")
    }
}

/// Render the report and write it into `output_dir`, returning its path.
pub fn write_markdown_report(
    output_dir: &Path,
    findings: &[CveFinding],
    context: &ReportContext,
    generated: NaiveDateTime,
) -> Result<PathBuf> {
    let path = output_dir.join(report_file_name(context, generated));
    let content = render_markdown_report(findings, context, generated);
    atomic_write(&path, content.as_bytes())
        .with_context(|| format!("Failed to write CVE report: {}", path.display()))?;
    tracing::debug!("Wrote CVE report to {}", path.display());
    Ok(path)
}
