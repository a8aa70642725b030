//! Kubescape vulnerability resources.
//!
//! The Kubescape operator writes one VulnerabilityManifestSummary (VMS) per
//! scanned workload, in the workload's namespace, and keeps the full
//! VulnerabilityManifest (VM) it points at in the `kubescape` namespace.
//! Extraction lists the summaries, follows each to its manifest and collects
//! the findings:
//!
//! 1. list summaries, per filtered namespace or across all namespaces
//! 2. fetch each summary; its manifest is `spec.vulnerabilitiesRef.all`, else
//!    `.relevant`
//! 3. drop summaries whose workload namespace is outside the filter
//! 4. fetch the manifest and extract the findings passing the severity filter
//! 5. keep the first finding per CVE id across all manifests
//!
//! A summary or manifest that cannot be read is skipped and counted in
//! [`ExtractionStats`]. Only a missing kubectl aborts the run.

use anyhow::Result;
use futures::stream::{self, StreamExt};
use serde::Deserialize;

use super::{Kubectl, ObjectMeta};
use crate::constants::{KUBESCAPE_NAMESPACE, MANIFEST_FETCH_CONCURRENCY, WORKLOAD_NAMESPACE_LABEL};
use crate::core::OpsError;
use crate::cve::{CveFinding, SeverityFilter, dedupe_findings, extract_from_manifest};
use crate::utils::progress::ProgressBar;

const SUMMARY_KIND: &str = "vulnerabilitymanifestsummary";
const MANIFEST_KIND: &str = "vulnerabilitymanifest";

#[derive(Debug, Clone, Deserialize)]
pub struct VulnerabilityManifestSummary {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: SummarySpec,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummarySpec {
    #[serde(default, rename = "vulnerabilitiesRef")]
    pub vulnerabilities_ref: Option<VulnerabilitiesRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VulnerabilitiesRef {
    #[serde(default)]
    pub all: Option<ManifestRef>,
    #[serde(default)]
    pub relevant: Option<ManifestRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManifestRef {
    #[serde(default)]
    pub name: Option<String>,
}

impl ManifestRef {
    fn non_empty_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }
}

impl VulnerabilityManifestSummary {
    /// Name of the manifest holding this workload's findings.
    pub fn manifest_name(&self) -> Option<&str> {
        let refs = self.spec.vulnerabilities_ref.as_ref()?;
        refs.all
            .as_ref()
            .and_then(ManifestRef::non_empty_name)
            .or_else(|| refs.relevant.as_ref().and_then(ManifestRef::non_empty_name))
    }

    /// Namespace of the scanned workload: the workload-namespace label, else
    /// the summary's own namespace.
    pub fn workload_namespace(&self) -> Option<&str> {
        self.metadata
            .label(WORKLOAD_NAMESPACE_LABEL)
            .filter(|ns| !ns.is_empty())
            .or(self.metadata.namespace.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VulnerabilityManifest {
    #[serde(default)]
    pub spec: ManifestSpec,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManifestSpec {
    #[serde(default)]
    pub payload: Payload,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Payload {
    #[serde(default)]
    pub matches: Option<Vec<VulnerabilityMatch>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VulnerabilityMatch {
    #[serde(default)]
    pub vulnerability: Option<Vulnerability>,
    #[serde(default)]
    pub artifact: Option<Artifact>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Vulnerability {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fix: Option<Fix>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fix {
    #[serde(default)]
    pub versions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Artifact {
    #[serde(default)]
    pub name: String,
}

impl VulnerabilityManifest {
    pub fn matches(&self) -> &[VulnerabilityMatch] {
        self.spec.payload.matches.as_deref().unwrap_or_default()
    }
}

impl Vulnerability {
    pub fn first_fix_version(&self) -> Option<&str> {
        self.fix.as_ref()?.versions.as_ref()?.first().map(String::as_str)
    }
}

/// Location of one VulnerabilityManifestSummary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRef {
    pub namespace: String,
    pub name: String,
}

/// Counters for one extraction run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    /// Summaries listed
    pub summaries: usize,
    /// Manifests that produced at least one finding
    pub with_findings: usize,
    /// Summaries that could not be fetched or parsed
    pub unreadable_summaries: usize,
    /// Summaries naming no manifest
    pub without_manifest_ref: usize,
    /// Summaries whose workload namespace is outside the filter
    pub filtered_by_namespace: usize,
    /// Manifests that could not be fetched or parsed
    pub missing_manifests: usize,
}

/// Deduplicated findings and the counters of the run that produced them.
#[derive(Debug, Clone, Default)]
pub struct CveExtraction {
    pub findings: Vec<CveFinding>,
    pub stats: ExtractionStats,
}

enum SummaryOutcome {
    Unreadable,
    NoManifestRef,
    FilteredOut,
    MissingManifest,
    Extracted(Vec<CveFinding>),
}

fn is_fatal(error: &anyhow::Error) -> bool {
    matches!(error.downcast_ref::<OpsError>(), Some(OpsError::KubectlNotFound))
}

/// Parse `NAMESPACE NAME` rows; rows with fewer than two columns are ignored.
pub fn parse_summary_rows(lines: &[String]) -> Vec<SummaryRef> {
    lines
        .iter()
        .filter_map(|line| {
            let mut columns = line.split_whitespace();
            Some(SummaryRef {
                namespace: columns.next()?.to_string(),
                name: columns.next()?.to_string(),
            })
        })
        .collect()
}

/// List summaries in `namespaces`, or in every namespace when it is empty.
///
/// A failing listing contributes no summaries.
pub async fn list_summaries(kubectl: &Kubectl, namespaces: &[String]) -> Result<Vec<SummaryRef>> {
    if namespaces.is_empty() {
        let listing = kubectl
            .command()
            .args(["get", SUMMARY_KIND])
            .all_namespaces()
            .args(["--no-headers", "-o", "custom-columns=NAMESPACE:.metadata.namespace,NAME:.metadata.name"])
            .with_context("summaries")
            .execute_lines()
            .await;
        return match listing {
            Ok(lines) => Ok(parse_summary_rows(&lines)),
            Err(e) if is_fatal(&e) => Err(e),
            Err(e) => {
                tracing::warn!(target: "cve", "Could not list vulnerability summaries: {:#}", e);
                Ok(Vec::new())
            }
        };
    }

    let mut refs = Vec::new();
    for namespace in namespaces {
        let listing = kubectl
            .command()
            .args(["get", SUMMARY_KIND, "--no-headers", "-o", "custom-columns=NAME:.metadata.name"])
            .namespace(namespace.as_str())
            .with_context(format!("summaries/{namespace}"))
            .execute_lines()
            .await;
        match listing {
            Ok(names) => refs.extend(names.into_iter().map(|name| SummaryRef {
                namespace: namespace.clone(),
                name,
            })),
            Err(e) if is_fatal(&e) => return Err(e),
            Err(e) => {
                tracing::warn!(
                    target: "cve",
                    "Could not list vulnerability summaries in {}: {:#}",
                    namespace,
                    e
                );
            }
        }
    }
    Ok(refs)
}

pub async fn fetch_summary(kubectl: &Kubectl, summary: &SummaryRef) -> Result<VulnerabilityManifestSummary> {
    kubectl
        .command()
        .args(["get", SUMMARY_KIND, summary.name.as_str()])
        .json_output()
        .namespace(summary.namespace.as_str())
        .with_context(format!("{}/{}", summary.namespace, summary.name))
        .execute_json()
        .await
}

/// Fetch a manifest from the Kubescape namespace.
pub async fn fetch_manifest(kubectl: &Kubectl, name: &str) -> Result<VulnerabilityManifest> {
    kubectl
        .command()
        .args(["get", MANIFEST_KIND, name])
        .json_output()
        .namespace(KUBESCAPE_NAMESPACE)
        .with_context(format!("{KUBESCAPE_NAMESPACE}/{name}"))
        .execute_json()
        .await
}

async fn process_summary(
    kubectl: &Kubectl,
    summary_ref: &SummaryRef,
    filter: SeverityFilter,
    namespaces: &[String],
) -> Result<SummaryOutcome> {
    let summary = match fetch_summary(kubectl, summary_ref).await {
        Ok(summary) => summary,
        Err(e) if is_fatal(&e) => return Err(e),
        Err(e) => {
            tracing::debug!(target: "cve", "Skipping summary {}: {:#}", summary_ref.name, e);
            return Ok(SummaryOutcome::Unreadable);
        }
    };

    let Some(manifest_name) = summary.manifest_name() else {
        return Ok(SummaryOutcome::NoManifestRef);
    };

    let workload_namespace = summary.workload_namespace().unwrap_or_default();
    if !namespaces.is_empty() && !namespaces.iter().any(|ns| ns == workload_namespace) {
        return Ok(SummaryOutcome::FilteredOut);
    }

    let manifest = match fetch_manifest(kubectl, manifest_name).await {
        Ok(manifest) => manifest,
        Err(e) if is_fatal(&e) => return Err(e),
        Err(e) => {
            tracing::debug!(target: "cve", "Skipping manifest {}: {:#}", manifest_name, e);
            return Ok(SummaryOutcome::MissingManifest);
        }
    };

    Ok(SummaryOutcome::Extracted(extract_from_manifest(&manifest, filter, workload_namespace)))
}

/// Collect deduplicated findings from every summary in scope.
///
/// Up to [`MANIFEST_FETCH_CONCURRENCY`] summaries are processed at once, but
/// results are combined in listing order so the output is deterministic.
pub async fn extract_cves(
    kubectl: &Kubectl,
    filter: SeverityFilter,
    namespaces: &[String],
    progress: Option<&ProgressBar>,
) -> Result<CveExtraction> {
    let summaries = list_summaries(kubectl, namespaces).await?;
    let mut stats = ExtractionStats {
        summaries: summaries.len(),
        ..ExtractionStats::default()
    };

    if summaries.is_empty() {
        tracing::debug!(target: "cve", "No vulnerability summaries found");
        return Ok(CveExtraction::default());
    }

    let outcomes: Vec<Result<SummaryOutcome>> = stream::iter(&summaries)
        .map(|summary_ref| async move {
            let outcome = process_summary(kubectl, summary_ref, filter, namespaces).await;
            if let Some(pb) = progress {
                pb.inc(1);
            }
            outcome
        })
        .buffered(MANIFEST_FETCH_CONCURRENCY)
        .collect()
        .await;

    let mut all_findings = Vec::new();
    for outcome in outcomes {
        match outcome? {
            SummaryOutcome::Unreadable => stats.unreadable_summaries += 1,
            SummaryOutcome::NoManifestRef => stats.without_manifest_ref += 1,
            SummaryOutcome::FilteredOut => stats.filtered_by_namespace += 1,
            SummaryOutcome::MissingManifest => stats.missing_manifests += 1,
            SummaryOutcome::Extracted(findings) => {
                if !findings.is_empty() {
                    stats.with_findings += 1;
                }
                all_findings.extend(findings);
            }
        }
    }

    let findings = dedupe_findings(all_findings);
    tracing::info!(
        target: "cve",
        "Processed {} summaries: {} manifests with findings, {} without manifest reference, \
        {} outside namespace filter, {} missing manifests, {} unreadable; {} unique CVEs",
        stats.summaries,
        stats.with_findings,
        stats.without_manifest_ref,
        stats.filtered_by_namespace,
        stats.missing_manifests,
        stats.unreadable_summaries,
        findings.len()
    );

    Ok(CveExtraction {
        findings,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(json: &str) -> VulnerabilityManifestSummary {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_manifest_name_prefers_all() {
        let vms = summary(
            r#"{"metadata": {"name": "s"}, "spec": {"vulnerabilitiesRef": {
                "all": {"name": "vm-all"}, "relevant": {"name": "vm-relevant"}}}}"#,
        );
        assert_eq!(vms.manifest_name(), Some("vm-all"));
    }

    #[test]
    fn test_manifest_name_falls_back_to_relevant() {
        let vms = summary(
            r#"{"metadata": {"name": "s"}, "spec": {"vulnerabilitiesRef": {
                "all": {"name": ""}, "relevant": {"name": "vm-relevant"}}}}"#,
        );
        assert_eq!(vms.manifest_name(), Some("vm-relevant"));

        let vms = summary(r#"{"metadata": {"name": "s"}, "spec": {"vulnerabilitiesRef": {}}}"#);
        assert_eq!(vms.manifest_name(), None);
        assert_eq!(summary(r#"{"metadata": {"name": "s"}}"#).manifest_name(), None);
    }

    #[test]
    fn test_workload_namespace() {
        let vms = summary(
            r#"{"metadata": {"name": "s", "namespace": "kubescape",
                "labels": {"kubescape.io/workload-namespace": "kommander"}}}"#,
        );
        assert_eq!(vms.workload_namespace(), Some("kommander"));

        let vms = summary(r#"{"metadata": {"name": "s", "namespace": "default"}}"#);
        assert_eq!(vms.workload_namespace(), Some("default"));
    }

    #[test]
    fn test_parse_summary_rows() {
        let lines = vec![
            "kommander   replicaset-traefik-abc".to_string(),
            "lonely".to_string(),
            "default pod-nginx extra".to_string(),
        ];
        assert_eq!(
            parse_summary_rows(&lines),
            vec![
                SummaryRef {
                    namespace: "kommander".to_string(),
                    name: "replicaset-traefik-abc".to_string()
                },
                SummaryRef {
                    namespace: "default".to_string(),
                    name: "pod-nginx".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_first_fix_version() {
        let vulnerability: Vulnerability =
            serde_json::from_str(r#"{"fix": {"versions": ["1.0.1", "1.1.0"]}}"#).unwrap();
        assert_eq!(vulnerability.first_fix_version(), Some("1.0.1"));
        let vulnerability: Vulnerability = serde_json::from_str(r#"{"fix": {"state": "not-fixed"}}"#).unwrap();
        assert_eq!(vulnerability.first_fix_version(), None);
    }

    #[cfg(unix)]
    fn fake_cluster(temp: &tempfile::TempDir) -> Kubectl {
        let program = crate::test_utils::kubescape_cluster(temp.path()).install().unwrap();
        Kubectl::new(temp.path().join("kubeconfig")).with_program(program.display().to_string())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_extract_all_severities() {
        crate::test_utils::init_test_logging(None);
        let temp = tempfile::TempDir::new().unwrap();
        let kubectl = fake_cluster(&temp);

        let extraction = extract_cves(&kubectl, SeverityFilter::All, &[], None).await.unwrap();
        let ids: Vec<&str> = extraction.findings.iter().map(|f| f.cve.as_str()).collect();
        assert_eq!(ids, vec!["CVE-2024-0001", "CVE-2024-0002", "CVE-2024-0003"]);

        // First occurrence wins across manifests.
        let first = &extraction.findings[0];
        assert_eq!(first.severity, "Critical");
        assert_eq!(first.namespace, "kommander");
        assert_eq!(first.component, "openssl");
        assert_eq!(first.fixed_version, "3.0.13");
        assert_eq!(extraction.findings[1].fixed_version, "");
        assert_eq!(extraction.findings[2].namespace, "kube-system");

        assert_eq!(
            extraction.stats,
            ExtractionStats {
                summaries: 3,
                with_findings: 2,
                without_manifest_ref: 1,
                ..ExtractionStats::default()
            }
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_extract_filters_severity() {
        let temp = tempfile::TempDir::new().unwrap();
        let kubectl = fake_cluster(&temp);

        let extraction = extract_cves(&kubectl, SeverityFilter::Critical, &[], None).await.unwrap();
        assert_eq!(extraction.findings.len(), 1);
        assert_eq!(extraction.findings[0].cve, "CVE-2024-0001");
        assert_eq!(extraction.stats.with_findings, 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_extract_with_namespace_filter() {
        let temp = tempfile::TempDir::new().unwrap();
        let kubectl = fake_cluster(&temp);

        let namespaces = vec!["kube-system".to_string(), "flux".to_string()];
        let extraction = extract_cves(&kubectl, SeverityFilter::All, &namespaces, None).await.unwrap();
        let ids: Vec<&str> = extraction.findings.iter().map(|f| f.cve.as_str()).collect();
        assert_eq!(ids, vec!["CVE-2024-0001", "CVE-2024-0003"]);
        assert_eq!(extraction.findings[0].severity, "High");
        assert_eq!(extraction.stats.summaries, 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_summary_outside_namespace_filter_is_skipped() {
        let temp = tempfile::TempDir::new().unwrap();
        let program = crate::test_utils::kubescape_cluster(temp.path())
            .respond("custom-columns=NAME:.metadata.name -n kubescape", "summary-a\n")
            .install()
            .unwrap();
        let kubectl = Kubectl::default().with_program(program.display().to_string());

        // summary-a lives in kubescape but scans a kommander workload.
        let namespaces = vec!["kubescape".to_string()];
        let extraction = extract_cves(&kubectl, SeverityFilter::All, &namespaces, None).await.unwrap();
        assert!(extraction.findings.is_empty());
        assert_eq!(extraction.stats.filtered_by_namespace, 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_listing_yields_nothing() {
        let temp = tempfile::TempDir::new().unwrap();
        let program = crate::test_utils::FakeKubectl::new(temp.path()).install().unwrap();
        let kubectl = Kubectl::default().with_program(program.display().to_string());

        let extraction = extract_cves(&kubectl, SeverityFilter::All, &[], None).await.unwrap();
        assert!(extraction.findings.is_empty());
        assert_eq!(extraction.stats, ExtractionStats::default());
    }

    #[tokio::test]
    async fn test_missing_kubectl_aborts_extraction() {
        let kubectl = Kubectl::default().with_program("/nonexistent/clusterops-test/kubectl");
        let err = extract_cves(&kubectl, SeverityFilter::All, &[], None).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<OpsError>(), Some(OpsError::KubectlNotFound)));
    }
}
