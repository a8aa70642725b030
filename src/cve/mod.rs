//! CVE findings from Kubescape vulnerability manifests.
//!
//! Kubescape stores one VulnerabilityManifest per scanned image. Each of its
//! `spec.payload.matches[]` pairs a vulnerability with the affected artifact.
//! This module turns those matches into flat [`CveFinding`]s, applies the
//! severity filter and removes duplicates:
//!
//! - within a manifest, a CVE id is kept once
//! - across manifests ([`dedupe_findings`]), the first manifest to report a CVE
//!   id wins, so a finding's namespace and image are those of that manifest
//!
//! Severity matching is by substring on the lowercased severity, so the
//! `high` filter also admits a severity spelled `HIGH` or `very-high`.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::kube::vulnerability::VulnerabilityManifest;

/// Which findings a run keeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum)]
pub enum SeverityFilter {
    #[default]
    All,
    Critical,
    High,
    Medium,
    Low,
}

impl SeverityFilter {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Whether a finding with this severity passes the filter.
    pub fn matches(self, severity: &str) -> bool {
        match self.level() {
            None => true,
            Some(level) => level.matches(severity),
        }
    }

    /// The single level this filter selects, or `None` for `all`.
    pub const fn level(self) -> Option<SeverityLevel> {
        match self {
            Self::All => None,
            Self::Critical => Some(SeverityLevel::Critical),
            Self::High => Some(SeverityLevel::High),
            Self::Medium => Some(SeverityLevel::Medium),
            Self::Low => Some(SeverityLevel::Low),
        }
    }

    /// Whether report sections for `level` are shown under this filter.
    pub fn shows(self, level: SeverityLevel) -> bool {
        self.level().is_none_or(|selected| selected == level)
    }
}

impl fmt::Display for SeverityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four severities reports are grouped by, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeverityLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl SeverityLevel {
    pub const ALL: [Self; 4] = [Self::Critical, Self::High, Self::Medium, Self::Low];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn matches(self, severity: &str) -> bool {
        severity.to_lowercase().contains(self.as_str())
    }

    /// First level, in severity order, that `severity` matches.
    pub fn classify(severity: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.matches(severity))
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One vulnerability affecting one artifact of a scanned workload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CveFinding {
    pub cve: String,
    pub severity: String,
    pub description: String,
    pub component: String,
    /// Namespace of the scanned workload.
    pub namespace: String,
    pub image: String,
    /// First fixed version, or empty when no fix is known.
    #[serde(rename = "fixedVersion")]
    pub fixed_version: String,
}

/// Findings of one manifest that pass `filter`, one per CVE id.
///
/// Matches without a vulnerability or without an id are skipped.
pub fn extract_from_manifest(
    manifest: &VulnerabilityManifest,
    filter: SeverityFilter,
    namespace: &str,
) -> Vec<CveFinding> {
    let mut seen = HashSet::new();
    let mut findings = Vec::new();

    for entry in manifest.matches() {
        let Some(vulnerability) = &entry.vulnerability else {
            continue;
        };

        let severity = vulnerability.severity.as_deref().unwrap_or("unknown");
        if !filter.matches(severity) {
            continue;
        }

        let Some(id) = vulnerability.id.as_deref().filter(|id| !id.is_empty()) else {
            continue;
        };
        if !seen.insert(id) {
            continue;
        }

        let artifact = entry.artifact.as_ref().map(|a| a.name.clone()).unwrap_or_default();
        findings.push(CveFinding {
            cve: id.to_string(),
            severity: severity.to_string(),
            description: vulnerability.description.clone().unwrap_or_default(),
            component: artifact.clone(),
            namespace: namespace.to_string(),
            image: artifact,
            fixed_version: vulnerability.first_fix_version().unwrap_or_default().to_string(),
        });
    }

    findings
}

/// Keep the first finding for each CVE id, preserving order.
pub fn dedupe_findings(findings: impl IntoIterator<Item = CveFinding>) -> Vec<CveFinding> {
    let mut seen = HashSet::new();
    findings
        .into_iter()
        .filter(|finding| !finding.cve.is_empty() && seen.insert(finding.cve.clone()))
        .collect()
}

/// Findings per severity level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityCounts {
    /// Count the findings passing `filter`, each in its most severe matching
    /// level. Findings matching no level are not counted.
    pub fn from_findings(findings: &[CveFinding], filter: SeverityFilter) -> Self {
        let mut counts = Self::default();
        for finding in findings.iter().filter(|f| filter.matches(&f.severity)) {
            match SeverityLevel::classify(&finding.severity) {
                Some(SeverityLevel::Critical) => counts.critical += 1,
                Some(SeverityLevel::High) => counts.high += 1,
                Some(SeverityLevel::Medium) => counts.medium += 1,
                Some(SeverityLevel::Low) => counts.low += 1,
                None => {}
            }
        }
        counts
    }

    pub const fn get(&self, level: SeverityLevel) -> usize {
        match level {
            SeverityLevel::Critical => self.critical,
            SeverityLevel::High => self.high,
            SeverityLevel::Medium => self.medium,
            SeverityLevel::Low => self.low,
        }
    }

    pub const fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

/// Findings whose severity matches `level`, in input order.
pub fn findings_at(findings: &[CveFinding], level: SeverityLevel) -> Vec<&CveFinding> {
    findings.iter().filter(|f| level.matches(&f.severity)).collect()
}
