//! Test utilities for clusterops.
//!
//! Available to unit tests and, through the `test-utils` feature, to the
//! integration tests. Nothing here talks to a real cluster: [`FakeKubectl`]
//! installs a shell script that answers kubectl invocations from canned
//! files.
//!
//! ```rust,no_run
//! use clusterops_cli::test_utils::FakeKubectl;
//! use tempfile::TempDir;
//!
//! let temp = TempDir::new().unwrap();
//! let kubectl = FakeKubectl::new(temp.path())
//!     .respond("get clusterapps", r#"{"items": []}"#)
//!     .install()
//!     .unwrap();
//! // point `Kubectl::with_program` or the `kubectl` config key at `kubectl`
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, else `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=graph=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true) // targets like "kubectl" and "graph"
            .with_thread_ids(false)
            .try_init();
    });
}

/// Scripted stand-in for the kubectl binary.
///
/// Each response is chosen by the first registered fragment contained in the
/// joined argument list. Unmatched invocations fail like kubectl does, with a
/// message on stderr and exit code 1.
#[derive(Debug, Clone)]
pub struct FakeKubectl {
    dir: PathBuf,
    responses: Vec<(String, String)>,
}

impl FakeKubectl {
    /// Script and response files are written into `dir`.
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            responses: Vec::new(),
        }
    }

    /// Answer invocations containing `args_fragment` with `stdout`.
    pub fn respond(mut self, args_fragment: impl Into<String>, stdout: impl Into<String>) -> Self {
        self.responses.push((args_fragment.into(), stdout.into()));
        self
    }

    /// Write the script and return its path.
    #[cfg(unix)]
    pub fn install(&self) -> Result<PathBuf> {
        use std::os::unix::fs::PermissionsExt;

        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;

        let mut script = String::from("#!/bin/sh\ncase \"$*\" in\n");
        for (index, (fragment, stdout)) in self.responses.iter().enumerate() {
            let body = self.dir.join(format!("kubectl-response-{index}"));
            std::fs::write(&body, stdout).with_context(|| format!("Failed to write {}", body.display()))?;
            script.push_str(&format!("  *\"{fragment}\"*) cat '{}' ;;\n", body.display()));
        }
        script.push_str("  *) echo \"error: the server doesn't have a resource type: $*\" >&2; exit 1 ;;\nesac\n");

        let path = self.dir.join("kubectl");
        std::fs::write(&path, script).with_context(|| format!("Failed to write {}", path.display()))?;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
        Ok(path)
    }
}

/// `kubectl get clusterapps -A -o json` output for a small management
/// cluster: one root chain plus an orphan whose dependency is not installed.
pub const CLUSTERAPPS_JSON: &str = r#"{
  "apiVersion": "v1",
  "kind": "List",
  "items": [
    {"metadata": {"name": "cert-manager-1.14.2", "namespace": "kommander",
      "annotations": {"apps.kommander.d2iq.io/dependencies": "N/A"}}},
    {"metadata": {"name": "traefik-27.0.2", "namespace": "kommander",
      "annotations": {"apps.kommander.d2iq.io/dependencies": "cert-manager"}}},
    {"metadata": {"name": "kommander-0.12.0", "namespace": "kommander",
      "annotations": {"apps.kommander.d2iq.io/required-dependencies": "cert-manager, traefik"}}},
    {"metadata": {"name": "grafana-loki-0.79.5", "namespace": "kommander",
      "annotations": {"apps.kommander.d2iq.io/dependencies": "rook-ceph-cluster"}}}
  ]
}"#;

const SUMMARY_A_JSON: &str = r#"{
  "metadata": {"name": "summary-a", "namespace": "kubescape",
    "labels": {"kubescape.io/workload-namespace": "kommander"}},
  "spec": {"vulnerabilitiesRef": {"all": {"name": "vm-a"}, "relevant": {"name": ""}}}
}"#;

const SUMMARY_B_JSON: &str = r#"{
  "metadata": {"name": "summary-b", "namespace": "kube-system"},
  "spec": {"vulnerabilitiesRef": {"all": {"name": ""}, "relevant": {"name": "vm-b"}}}
}"#;

const SUMMARY_C_JSON: &str = r#"{"metadata": {"name": "summary-c", "namespace": "kubescape"}, "spec": {}}"#;

const MANIFEST_A_JSON: &str = r#"{
  "spec": {"payload": {"matches": [
    {"vulnerability": {"id": "CVE-2024-0001", "severity": "Critical",
      "description": "heap overflow | in parser", "fix": {"versions": ["3.0.13", "3.1.5"]}},
     "artifact": {"name": "openssl"}},
    {"vulnerability": {"id": "CVE-2024-0002", "severity": "Low", "description": "timing leak"},
     "artifact": {"name": "zlib"}},
    {"vulnerability": {"id": "CVE-2024-0001", "severity": "Critical"}, "artifact": {"name": "openssl"}},
    {"artifact": {"name": "busybox"}}
  ]}}
}"#;

const MANIFEST_B_JSON: &str = r#"{
  "spec": {"payload": {"matches": [
    {"vulnerability": {"id": "CVE-2024-0001", "severity": "High", "description": "other image"},
     "artifact": {"name": "libssl"}},
    {"vulnerability": {"id": "CVE-2024-0003", "severity": "Medium", "description": "path traversal"},
     "artifact": {"name": "coredns"}}
  ]}}
}"#;

/// A Kubescape-scanned cluster with three summaries:
///
/// - `summary-a` (workload namespace `kommander`) points at `vm-a`:
///   CVE-2024-0001 Critical and CVE-2024-0002 Low
/// - `summary-b` (namespace `kube-system`) points at `vm-b`: a High duplicate
///   of CVE-2024-0001 and CVE-2024-0003 Medium
/// - `summary-c` names no manifest
///
/// Listing the `flux` namespace fails.
pub fn kubescape_cluster(dir: &Path) -> FakeKubectl {
    FakeKubectl::new(dir)
        .respond(
            "vulnerabilitymanifestsummary -A --no-headers",
            "kubescape     summary-a\nkube-system   summary-b\nkubescape summary-c\nmalformed-row\n",
        )
        .respond("custom-columns=NAME:.metadata.name -n kommander", "summary-a\n")
        .respond("custom-columns=NAME:.metadata.name -n kube-system", "summary-b\n")
        .respond("vulnerabilitymanifestsummary summary-a -o json", SUMMARY_A_JSON)
        .respond("vulnerabilitymanifestsummary summary-b -o json", SUMMARY_B_JSON)
        .respond("vulnerabilitymanifestsummary summary-c -o json", SUMMARY_C_JSON)
        .respond("vulnerabilitymanifest vm-a -o json", MANIFEST_A_JSON)
        .respond("vulnerabilitymanifest vm-b -o json", MANIFEST_B_JSON)
        .respond("get clusterapps", CLUSTERAPPS_JSON)
}
