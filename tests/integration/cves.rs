#![cfg(unix)]

use predicates::prelude::*;

use crate::common::kubescape_cluster;

#[test]
fn test_extract_cves_json() {
    let cluster = kubescape_cluster();
    let output = cluster.command().args(["extract-cves", "--severity", "all"]).output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let findings: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let findings = findings.as_array().unwrap();
    assert_eq!(findings.len(), 3);
    assert_eq!(findings[0]["cve"], "CVE-2024-0001");
    assert_eq!(findings[0]["severity"], "Critical");
    assert_eq!(findings[0]["fixedVersion"], "3.0.13");
    assert_eq!(findings[0]["namespace"], "kommander");
    assert_eq!(findings[2]["image"], "coredns");
}

#[test]
fn test_extract_cves_with_namespace_and_kubeconfig() {
    let cluster = kubescape_cluster();
    let output = cluster
        .command()
        .args(["extract-cves", "--severity", "medium", "--namespace", "kube-system, kommander", "--kubeconfig"])
        .arg(&cluster.kubeconfig)
        .output()
        .unwrap();
    assert!(output.status.success());

    let findings: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(findings.as_array().unwrap().len(), 1);
    assert_eq!(findings[0]["cve"], "CVE-2024-0003");
}

#[test]
fn test_extract_cves_empty_is_array() {
    let cluster = kubescape_cluster();
    cluster
        .command()
        .args(["extract-cves", "--severity", "high", "--namespace", "flux"])
        .assert()
        .success()
        .stdout("[]\n");
}

#[test]
fn test_cves_console_and_markdown_report() {
    let cluster = kubescape_cluster();
    let reports = cluster.path().join("reports");

    cluster
        .command()
        .args(["cves", "all", "edge", "--output-dir"])
        .arg(&reports)
        .assert()
        .success()
        .stdout(predicate::str::contains("Kubescape CVE Scanner"))
        .stdout(predicate::str::contains("CVE Report - Edge Cluster (Severity: ALL)"))
        .stdout(predicate::str::contains("CVE: CVE-2024-0002"))
        .stdout(predicate::str::contains("Jira-formatted report saved to"))
        .stdout(predicate::str::contains("Report Complete"));

    let written: Vec<_> = std::fs::read_dir(&reports).unwrap().map(|e| e.unwrap().path()).collect();
    assert_eq!(written.len(), 1);
    let name = written[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("kubescape-cve-report-edge-all-"));
    assert!(name.ends_with(".md"));

    let report = std::fs::read_to_string(&written[0]).unwrap();
    assert!(report.contains("CVE-2024-0001"));
    assert!(report.contains("heap overflow \\| in parser"));
    assert!(report.ends_with("*Report generated by kubescape CVE scanner*\n"));
}

#[test]
fn test_cves_without_report() {
    let cluster = kubescape_cluster();

    cluster
        .command()
        .args(["cves", "critical", "--no-report", "-n", "kommander"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Namespace Filter:"))
        .stdout(predicate::str::contains("CVE: CVE-2024-0001"))
        .stdout(predicate::str::contains("CVE-2024-0003").not())
        .stdout(predicate::str::contains("report saved").not());

    let leftovers = std::fs::read_dir(cluster.path())
        .unwrap()
        .filter(|e| e.as_ref().unwrap().file_name().to_string_lossy().starts_with("kubescape-cve-report"))
        .count();
    assert_eq!(leftovers, 0);
}

#[test]
fn test_cves_with_no_findings() {
    let cluster = kubescape_cluster();

    cluster
        .command()
        .args(["cves", "low", "--no-report", "--namespace", "kube-system"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No CVEs found matching severity filter: low"));
}

#[test]
fn test_kubectl_failure_is_reported() {
    let cluster = crate::common::TestCluster::new(|dir| {
        use std::os::unix::fs::PermissionsExt;
        std::fs::create_dir_all(dir).unwrap();
        let path = dir.join("kubectl");
        std::fs::write(&path, "#!/bin/sh\necho 'error: You must be logged in to the server (Unauthorized)' >&2\nexit 1\n")
            .unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    });

    cluster
        .command()
        .args(["diagram", "--stdout"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("kubectl operation failed: get clusterapps"))
        .stderr(predicate::str::contains("credentials were rejected"));
}
