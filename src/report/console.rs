//! Colored terminal report.

use colored::Colorize;
use std::fmt;
use std::path::Path;

use super::ReportContext;
use crate::cve::{CveFinding, SeverityCounts, SeverityLevel, findings_at};

const BANNER_WIDTH: usize = 64;

/// A cyan banner around `text`, with a blank line on either side.
pub fn header(text: &str) -> String {
    let rule = "=".repeat(BANNER_WIDTH);
    format!("\n{}\n{}\n{}\n", rule.cyan(), format!("  {text}").cyan(), rule.cyan())
}

/// Scanner banner listing the run parameters.
pub fn render_scan_banner(context: &ReportContext, kubeconfig: Option<&Path>) -> String {
    ScanBanner { context, kubeconfig }.to_string()
}

/// Summary counts followed by one section per shown severity.
pub fn render_findings(findings: &[CveFinding], context: &ReportContext) -> String {
    FindingsReport { findings, context }.to_string()
}

struct ScanBanner<'a> {
    context: &'a ReportContext,
    kubeconfig: Option<&'a Path>,
}

impl fmt::Display for ScanBanner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&header("Kubescape CVE Scanner"))?;
        writeln!(f)?;
        writeln!(f, "{} {}", "Cluster:".cyan(), self.context.cluster_name)?;
        writeln!(f, "{} {}", "Severity Filter:".cyan(), self.context.severity_label())?;
        if let Some(namespaces) = self.context.namespace_filter() {
            writeln!(f, "{} {}", "Namespace Filter:".cyan(), namespaces)?;
        }
        if let Some(kubeconfig) = self.kubeconfig {
            writeln!(f, "{} {}", "Kubeconfig:".cyan(), kubeconfig.display())?;
        }
        Ok(())
    }
}

struct FindingsReport<'a> {
    findings: &'a [CveFinding],
    context: &'a ReportContext,
}

impl FindingsReport<'_> {
    fn write_finding(f: &mut fmt::Formatter<'_>, finding: &CveFinding, rule: &str) -> fmt::Result {
        writeln!(f, "CVE: {}", finding.cve)?;
        writeln!(f, "Severity: {}", finding.severity)?;
        writeln!(f, "Component: {}", finding.component)?;
        writeln!(f, "Namespace: {}", finding.namespace)?;
        writeln!(f, "Image: {}", finding.image)?;
        writeln!(f, "Fixed Version: {}", finding.fixed_version)?;
        writeln!(f, "Description: {}", finding.description)?;
        writeln!(f, "{rule}")?;
        writeln!(f)
    }
}

impl fmt::Display for FindingsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let context = self.context;
        let title = format!("CVE Report - {} (Severity: {})", context.cluster_name, context.severity_label());
        f.write_str(&header(&title))?;
        writeln!(f)?;

        if self.findings.is_empty() {
            writeln!(
                f,
                "{}",
                format!("✓ No CVEs found matching severity filter: {}", context.severity).green()
            )?;
            return writeln!(f);
        }

        let counts = SeverityCounts::from_findings(self.findings, context.severity);
        writeln!(f, "{}", "Summary:".cyan())?;
        writeln!(f, "  {}", format!("Critical: {}", counts.critical).red())?;
        writeln!(f, "  {}", format!("High: {}", counts.high).yellow())?;
        writeln!(f, "  {}", format!("Medium: {}", counts.medium).blue())?;
        writeln!(f, "  {}", format!("Low: {}", counts.low).green())?;
        writeln!(f)?;

        let rule = "─".repeat(BANNER_WIDTH);
        for level in SeverityLevel::ALL {
            if !context.severity.shows(level) {
                continue;
            }
            let at_level = findings_at(self.findings, level);
            if at_level.is_empty() {
                continue;
            }

            writeln!(f, "{}", rule.cyan())?;
            writeln!(f, "{}", format!("{} Severity CVEs", level.as_str().to_uppercase()).cyan())?;
            writeln!(f, "{}", rule.cyan())?;
            writeln!(f)?;

            for finding in at_level {
                Self::write_finding(f, finding, &rule)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cve::SeverityFilter;

    fn finding(cve: &str, severity: &str) -> CveFinding {
        CveFinding {
            cve: cve.to_string(),
            severity: severity.to_string(),
            description: "desc".to_string(),
            component: "openssl".to_string(),
            namespace: "kommander".to_string(),
            image: "openssl".to_string(),
            fixed_version: "3.0.14".to_string(),
        }
    }

    fn context(severity: SeverityFilter) -> ReportContext {
        ReportContext::new("mgmt", "Management Cluster", severity)
    }

    #[test]
    fn test_header_layout() {
        let text = header("Report Complete");
        assert!(text.contains("  Report Complete"));
        assert!(text.contains(&"=".repeat(64)));
        assert!(text.starts_with('\n'));
    }

    #[test]
    fn test_no_findings() {
        let out = render_findings(&[], &context(SeverityFilter::Critical));
        assert!(out.contains("CVE Report - Management Cluster (Severity: CRITICAL)"));
        assert!(out.contains("No CVEs found matching severity filter: critical"));
        assert!(!out.contains("Summary:"));
    }

    #[test]
    fn test_sections_follow_severity_order() {
        let findings = vec![finding("CVE-low", "Low"), finding("CVE-crit", "Critical"), finding("CVE-high", "High")];
        let out = render_findings(&findings, &context(SeverityFilter::All));

        assert!(out.contains("Critical: 1"));
        assert!(out.contains("High: 1"));
        assert!(out.contains("Medium: 0"));
        assert!(out.contains("Low: 1"));
        assert!(!out.contains("MEDIUM Severity CVEs"));

        let critical = out.find("CVE: CVE-crit").unwrap();
        let high = out.find("CVE: CVE-high").unwrap();
        let low = out.find("CVE: CVE-low").unwrap();
        assert!(critical < high && high < low);
        assert!(out.contains("Fixed Version: 3.0.14"));
    }

    #[test]
    fn test_filter_limits_sections() {
        let findings = vec![finding("CVE-high", "High")];
        let out = render_findings(&findings, &context(SeverityFilter::High));
        assert!(out.contains("HIGH Severity CVEs"));
        assert!(!out.contains("CRITICAL Severity CVEs"));
    }

    #[test]
    fn test_scan_banner() {
        let ctx = context(SeverityFilter::High).with_namespaces(vec!["default".into(), "kube-system".into()]);
        let out = render_scan_banner(&ctx, Some(Path::new("/tmp/mgmt.kubeconfig")));
        assert!(out.contains("Kubescape CVE Scanner"));
        assert!(out.contains("default,kube-system"));
        assert!(out.contains("/tmp/mgmt.kubeconfig"));
        assert!(out.contains("HIGH"));
    }
}
