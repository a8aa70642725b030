//! Global clusterops configuration.
//!
//! Stored at `~/.clusterops/config.toml` (`%LOCALAPPDATA%\clusterops\config.toml`
//! on Windows) unless `--config` points elsewhere. Every key is optional:
//!
//! ```toml
//! # kubectl binary, when not the one on PATH
//! kubectl = "/usr/local/bin/kubectl"
//! kubectl_timeout_secs = 120
//! default_cluster = "mgmt"
//!
//! [clusters.mgmt]
//! kubeconfig = "~/.kube/mgmt.kubeconfig"
//! display_name = "Management Cluster"
//!
//! [clusters.edge]
//! kubeconfig = "$HOME/clusters/edge.conf"
//! ```
//!
//! Without a file, or with a file that defines no clusters, the profiles
//! `mgmt`, `workload1` and `workload2` point at `~/.kube/<name>.kubeconfig`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

use crate::constants::KUBECTL_DEFAULT_TIMEOUT;
use crate::core::OpsError;
use crate::kube::Kubectl;
use crate::utils::platform::resolve_path;

/// How to reach one cluster.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClusterProfile {
    /// Kubeconfig path; `~/` and environment variables are expanded.
    pub kubeconfig: String,

    /// Name shown in reports; defaults to the profile key.
    #[serde(default)]
    pub display_name: Option<String>,
}

impl ClusterProfile {
    pub fn new(kubeconfig: impl Into<String>) -> Self {
        Self {
            kubeconfig: kubeconfig.into(),
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }
}

fn default_clusters() -> BTreeMap<String, ClusterProfile> {
    [
        ("mgmt", "Management Cluster"),
        ("workload1", "Workload Cluster 1"),
        ("workload2", "Workload Cluster 2"),
    ]
    .into_iter()
    .map(|(name, display)| {
        (
            name.to_string(),
            ClusterProfile::new(format!("~/.kube/{name}.kubeconfig")).with_display_name(display),
        )
    })
    .collect()
}

fn default_cluster() -> String {
    "mgmt".to_string()
}

const fn default_kubectl_timeout_secs() -> u64 {
    KUBECTL_DEFAULT_TIMEOUT.as_secs()
}

/// User-wide settings: cluster profiles and kubectl invocation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GlobalConfig {
    /// Profile used when a command names no cluster
    #[serde(default = "default_cluster")]
    pub default_cluster: String,

    /// kubectl executable; `PATH` lookup when unset
    #[serde(default)]
    pub kubectl: Option<String>,

    /// Per-invocation kubectl timeout; must be positive
    #[serde(default = "default_kubectl_timeout_secs")]
    pub kubectl_timeout_secs: u64,

    /// Cluster profiles by name
    #[serde(default)]
    pub clusters: BTreeMap<String, ClusterProfile>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            clusters: default_clusters(),
            default_cluster: default_cluster(),
            kubectl: None,
            kubectl_timeout_secs: default_kubectl_timeout_secs(),
        }
    }
}

impl GlobalConfig {
    /// Load from `path` if given, else from the default location.
    ///
    /// A missing file yields the default configuration.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        if path.exists() {
            Self::load_from(&path).await
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config: Self =
            toml::from_str(&content).with_context(|| format!("Failed to parse config from {}", path.display()))?;
        if config.kubectl_timeout_secs == 0 {
            return Err(OpsError::ConfigError {
                message: format!("kubectl_timeout_secs must be greater than 0 in {}", path.display()),
            }
            .into());
        }
        if config.clusters.is_empty() {
            config.clusters = default_clusters();
        }
        tracing::debug!("Loaded config from {} with {} clusters", path.display(), config.clusters.len());
        Ok(config)
    }

    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("clusterops")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".clusterops")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Profile `name`, or [`OpsError::ClusterNotConfigured`].
    pub fn cluster(&self, name: &str) -> Result<&ClusterProfile, OpsError> {
        self.clusters.get(name).ok_or_else(|| OpsError::ClusterNotConfigured {
            name: name.to_string(),
        })
    }

    pub fn cluster_names(&self) -> impl Iterator<Item = &str> {
        self.clusters.keys().map(String::as_str)
    }

    /// Report name for profile `name`: its display name, else the key.
    pub fn display_name(&self, name: &str) -> String {
        self.clusters
            .get(name)
            .and_then(|profile| profile.display_name.clone())
            .unwrap_or_else(|| name.to_string())
    }

    /// Expanded kubeconfig path of profile `name`.
    ///
    /// # Errors
    ///
    /// [`OpsError::ClusterNotConfigured`] for an unknown profile and
    /// [`OpsError::KubeconfigNotFound`] when the file does not exist.
    pub fn resolve_kubeconfig(&self, name: &str) -> Result<PathBuf> {
        let profile = self.cluster(name)?;
        check_kubeconfig(&profile.kubeconfig)
    }

    pub fn kubectl_timeout(&self) -> Duration {
        Duration::from_secs(self.kubectl_timeout_secs)
    }

    /// kubectl settings for the cluster behind `kubeconfig`.
    pub fn kubectl_for(&self, kubeconfig: impl Into<PathBuf>) -> Kubectl {
        let kubectl = Kubectl::new(kubeconfig).with_timeout(self.kubectl_timeout());
        match &self.kubectl {
            Some(program) => kubectl.with_program(program.clone()),
            None => kubectl,
        }
    }
}

/// Expand a kubeconfig path and require that it exists.
pub fn check_kubeconfig(path: &str) -> Result<PathBuf> {
    let resolved = resolve_path(path)?;
    if !resolved.is_file() {
        return Err(OpsError::KubeconfigNotFound {
            path: resolved.display().to_string(),
        }
        .into());
    }
    Ok(resolved)
}
