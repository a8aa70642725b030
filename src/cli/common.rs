//! Shared plumbing for commands that talk to a cluster.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::config::{GlobalConfig, check_kubeconfig};
use crate::core::OpsError;
use crate::kube::Kubectl;
use crate::utils::platform::{command_exists, get_kubectl_command};

/// Everything a command needs to query one cluster.
#[derive(Debug, Clone)]
pub struct ClusterContext {
    /// Profile key, e.g. `mgmt`
    pub key: String,
    /// Name shown in reports
    pub display_name: String,
    /// Resolved kubeconfig path
    pub kubeconfig: PathBuf,
    /// kubectl preloaded with the kubeconfig and configured timeout
    pub kubectl: Kubectl,
}

impl ClusterContext {
    /// Resolve the cluster a command targets.
    ///
    /// `cluster` defaults to the configured default profile. An explicit
    /// `kubeconfig` wins over the profile's, so it works for clusters that
    /// have no profile at all.
    pub fn resolve(config: &GlobalConfig, cluster: Option<&str>, kubeconfig: Option<&Path>) -> Result<Self> {
        let key = cluster.unwrap_or(&config.default_cluster).to_string();
        let kubeconfig = match kubeconfig {
            Some(path) => check_kubeconfig(&path.to_string_lossy())?,
            None => config.resolve_kubeconfig(&key)?,
        };
        ensure_kubectl(config)?;

        tracing::debug!("Using cluster '{}' with kubeconfig {}", key, kubeconfig.display());
        Ok(Self {
            display_name: config.display_name(&key),
            kubectl: config.kubectl_for(&kubeconfig),
            kubeconfig,
            key,
        })
    }
}

/// Fail early when no kubectl is available.
///
/// A configured `kubectl` path is trusted as is; a missing binary there is
/// reported by the first invocation.
fn ensure_kubectl(config: &GlobalConfig) -> Result<()> {
    if config.kubectl.is_none() && !command_exists(get_kubectl_command()) {
        return Err(OpsError::KubectlNotFound.into());
    }
    Ok(())
}

/// Split `--namespace` values on commas, trimming and dropping empties and repeats.
pub fn parse_namespaces(values: &[String]) -> Vec<String> {
    let mut namespaces: Vec<String> = Vec::new();
    for namespace in values.iter().flat_map(|v| v.split(',')).map(str::trim) {
        if !namespace.is_empty() && !namespaces.iter().any(|n| n == namespace) {
            namespaces.push(namespace.to_string());
        }
    }
    namespaces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClusterProfile;
    use tempfile::TempDir;

    fn config_with(temp: &TempDir) -> (GlobalConfig, PathBuf) {
        let kubeconfig = temp.path().join("edge.conf");
        std::fs::write(&kubeconfig, "apiVersion: v1\n").unwrap();

        let mut config = GlobalConfig::default();
        config.kubectl = Some("/opt/kubectl".to_string());
        config.clusters.insert(
            "edge".to_string(),
            ClusterProfile::new(kubeconfig.display().to_string()).with_display_name("Edge Cluster"),
        );
        (config, kubeconfig)
    }

    #[test]
    fn test_parse_namespaces() {
        let values = vec!["kommander, kube-system".to_string(), ",kommander,".to_string(), "flux".to_string()];
        assert_eq!(parse_namespaces(&values), vec!["kommander", "kube-system", "flux"]);
        assert!(parse_namespaces(&[]).is_empty());
        assert!(parse_namespaces(&[" , ".to_string()]).is_empty());
    }

    #[test]
    fn test_resolve_profile() {
        let temp = TempDir::new().unwrap();
        let (config, kubeconfig) = config_with(&temp);

        let ctx = ClusterContext::resolve(&config, Some("edge"), None).unwrap();
        assert_eq!(ctx.key, "edge");
        assert_eq!(ctx.display_name, "Edge Cluster");
        assert_eq!(ctx.kubeconfig, kubeconfig);
        assert_eq!(ctx.kubectl.program(), "/opt/kubectl");
        assert_eq!(ctx.kubectl.kubeconfig(), Some(kubeconfig.as_path()));
    }

    #[test]
    fn test_explicit_kubeconfig_skips_profile() {
        let temp = TempDir::new().unwrap();
        let (config, kubeconfig) = config_with(&temp);

        let ctx = ClusterContext::resolve(&config, Some("unlisted"), Some(&kubeconfig)).unwrap();
        assert_eq!(ctx.key, "unlisted");
        assert_eq!(ctx.display_name, "unlisted");
        assert_eq!(ctx.kubeconfig, kubeconfig);
    }

    #[test]
    fn test_unknown_cluster_fails() {
        let temp = TempDir::new().unwrap();
        let (config, _) = config_with(&temp);

        let err = ClusterContext::resolve(&config, Some("nope"), None).unwrap_err();
        assert!(matches!(err.downcast_ref::<OpsError>(), Some(OpsError::ClusterNotConfigured { .. })));
    }

    #[test]
    fn test_missing_kubeconfig_fails() {
        let temp = TempDir::new().unwrap();
        let (config, _) = config_with(&temp);

        let missing = temp.path().join("missing.conf");
        let err = ClusterContext::resolve(&config, None, Some(&missing)).unwrap_err();
        assert!(matches!(err.downcast_ref::<OpsError>(), Some(OpsError::KubeconfigNotFound { .. })));
    }
}
