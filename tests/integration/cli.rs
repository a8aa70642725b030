use predicates::prelude::*;
use tempfile::TempDir;

use crate::common::clusterops;

#[test]
fn test_help_lists_commands() {
    clusterops()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("diagram"))
        .stdout(predicate::str::contains("cves"))
        .stdout(predicate::str::contains("extract-cves"));
}

#[test]
fn test_version() {
    clusterops().arg("--version").assert().success().stdout(predicate::str::contains("clusterops"));
}

#[test]
fn test_invalid_severity_is_rejected() {
    clusterops()
        .args(["extract-cves", "--severity", "urgent"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'urgent'"));
}

#[test]
fn test_unknown_cluster_shows_suggestion() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config.toml");
    std::fs::write(&config, "[clusters.mgmt]\nkubeconfig = \"/tmp/none\"\n").unwrap();

    clusterops()
        .arg("--config")
        .arg(&config)
        .args(["extract-cves", "--severity", "all", "--cluster", "nope"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Cluster 'nope' is not configured"))
        .stderr(predicate::str::contains("[clusters.nope]"));
}

#[test]
fn test_missing_kubeconfig() {
    let temp = TempDir::new().unwrap();
    clusterops()
        .args(["cves", "critical", "--no-report", "--config"])
        .arg(temp.path().join("absent.toml"))
        .env("HOME", temp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Kubeconfig not found"));
}

#[test]
fn test_invalid_config_file() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config.toml");
    std::fs::write(&config, "[clusters.mgmt\n").unwrap();

    clusterops()
        .arg("--config")
        .arg(&config)
        .args(["diagram", "--stdout"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"));
}
