//! Shared helpers for the integration tests.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// `clusterops` with progress output disabled and a clean log filter.
pub fn clusterops() -> Command {
    let mut cmd = Command::cargo_bin("clusterops").unwrap();
    cmd.env("CLUSTEROPS_NO_PROGRESS", "1").env_remove("RUST_LOG");
    cmd
}

/// A temporary workspace with a config whose `edge` cluster is served by
/// the given kubectl program.
pub struct TestCluster {
    pub temp: TempDir,
    pub config: PathBuf,
    pub kubeconfig: PathBuf,
}

impl TestCluster {
    pub fn new(kubectl: impl FnOnce(&Path) -> PathBuf) -> Self {
        let temp = TempDir::new().unwrap();
        let kubeconfig = temp.path().join("edge.kubeconfig");
        std::fs::write(&kubeconfig, "apiVersion: v1\nkind: Config\n").unwrap();

        let program = kubectl(&temp.path().join("bin"));
        let config = temp.path().join("config.toml");
        std::fs::write(
            &config,
            format!(
                "kubectl = {:?}\ndefault_cluster = \"edge\"\n\n[clusters.edge]\nkubeconfig = {:?}\ndisplay_name = \"Edge Cluster\"\n",
                program.display().to_string(),
                kubeconfig.display().to_string()
            ),
        )
        .unwrap();

        Self {
            temp,
            config,
            kubeconfig,
        }
    }

    /// `clusterops --config <config>` running inside the workspace.
    pub fn command(&self) -> Command {
        let mut cmd = clusterops();
        cmd.current_dir(self.temp.path()).arg("--config").arg(&self.config);
        cmd
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }
}

#[cfg(unix)]
pub fn kubescape_cluster() -> TestCluster {
    TestCluster::new(|dir| clusterops_cli::test_utils::kubescape_cluster(dir).install().unwrap())
}
