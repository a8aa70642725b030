//! Cluster access through the `kubectl` binary.
//!
//! clusterops never talks to the Kubernetes API directly. Every read is a
//! `kubectl` invocation built with [`KubectlCommand`] and parsed with serde.
//! [`Kubectl`] carries the per-cluster settings (kubeconfig, binary, timeout)
//! so fetchers only deal with resource kinds and names.
//!
//! - [`cluster_apps`] - ClusterApp listing and the dependency records derived from it
//! - [`vulnerability`] - Kubescape VulnerabilityManifestSummary/VulnerabilityManifest reads

pub mod cluster_apps;
pub mod command_builder;
pub mod vulnerability;

pub use command_builder::{KubectlCommand, KubectlOutput};

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::KUBECTL_DEFAULT_TIMEOUT;
use crate::utils::platform::get_kubectl_command;

/// kubectl settings for one cluster.
#[derive(Debug, Clone)]
pub struct Kubectl {
    program: String,
    kubeconfig: Option<PathBuf>,
    timeout: Duration,
}

impl Default for Kubectl {
    fn default() -> Self {
        Self {
            program: get_kubectl_command().to_string(),
            kubeconfig: None,
            timeout: KUBECTL_DEFAULT_TIMEOUT,
        }
    }
}

impl Kubectl {
    /// Settings for the cluster behind `kubeconfig`.
    pub fn new(kubeconfig: impl Into<PathBuf>) -> Self {
        Self {
            kubeconfig: Some(kubeconfig.into()),
            ..Self::default()
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn kubeconfig(&self) -> Option<&Path> {
        self.kubeconfig.as_deref()
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// A command preloaded with this cluster's settings.
    pub fn command(&self) -> KubectlCommand {
        let cmd = KubectlCommand::new()
            .program(self.program.clone())
            .with_timeout(Some(self.timeout));
        match &self.kubeconfig {
            Some(kubeconfig) => cmd.kubeconfig(kubeconfig),
            None => cmd,
        }
    }
}

/// The subset of Kubernetes `ObjectMeta` clusterops reads.
///
/// `null` label and annotation maps are treated as empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    labels: Option<BTreeMap<String, String>>,
    #[serde(default)]
    annotations: Option<BTreeMap<String, String>>,
}

impl ObjectMeta {
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.as_ref()?.get(key).map(String::as_str)
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.as_ref()?.get(key).map(String::as_str)
    }
}

/// A `kind: List` response from `kubectl get ... -o json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceList<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}
