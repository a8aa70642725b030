//! Global constants used throughout the clusterops codebase.
//!
//! Timeouts, Kubernetes annotation and label keys, and the markers that appear
//! in ClusterApp dependency annotations.

use std::time::Duration;

/// Default timeout for a single kubectl invocation (60 seconds).
pub const KUBECTL_DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Upper bound for a complete CVE extraction run (5 minutes).
pub const CVE_EXTRACTION_TIMEOUT: Duration = Duration::from_secs(300);

/// Number of VulnerabilityManifest fetches allowed in flight at once.
pub const MANIFEST_FETCH_CONCURRENCY: usize = 4;

/// Primary annotation carrying a ClusterApp's dependency list.
pub const DEPENDENCIES_ANNOTATION: &str = "apps.kommander.d2iq.io/dependencies";

/// Fallback annotation used when the primary one is missing or empty.
pub const REQUIRED_DEPENDENCIES_ANNOTATION: &str = "apps.kommander.d2iq.io/required-dependencies";

/// Dependency text meaning "this app declares no dependencies".
pub const NOT_APPLICABLE_MARKER: &str = "N/A";

/// Label on a VulnerabilityManifestSummary naming the scanned workload's namespace.
pub const WORKLOAD_NAMESPACE_LABEL: &str = "kubescape.io/workload-namespace";

/// Namespace where Kubescape stores VulnerabilityManifest resources.
pub const KUBESCAPE_NAMESPACE: &str = "kubescape";

/// Environment variable that disables spinners.
pub const NO_PROGRESS_ENV: &str = "CLUSTEROPS_NO_PROGRESS";

/// Default location of the generated block diagram, relative to the working directory.
pub const DEFAULT_DIAGRAM_PATH: &str = "docs/internal/CLUSTERAPP-BLOCK-DIAGRAM.md";
