use predicates::prelude::*;
use tempfile::TempDir;

use crate::common::clusterops;

const RECORDS: &str = "\
cert-manager-1.14.2|N/A
traefik-27.0.2|cert-manager
kommander-0.12.0|cert-manager, traefik

grafana-loki-0.79.5|rook-ceph-cluster
";

fn write_records(temp: &TempDir) -> std::path::PathBuf {
    let path = temp.path().join("apps.txt");
    std::fs::write(&path, RECORDS).unwrap();
    path
}

#[test]
fn test_diagram_to_stdout() {
    let temp = TempDir::new().unwrap();
    let input = write_records(&temp);

    let output = clusterops().args(["diagram", "--stdout", "--input"]).arg(&input).output().unwrap();
    assert!(output.status.success());

    let document = String::from_utf8(output.stdout).unwrap();
    assert!(document.starts_with("# ClusterApp Dependency Block Diagram\n"));
    assert!(document.contains("### Root Chain 1: cert-manager-1.14.2"));
    assert!(document.contains("### Orphaned Apps (not connected to any root)"));
    assert!(!document.contains("Root Chain 2"));

    // Breadth-first with sorted children: kommander before traefik.
    let kommander = document.find("kommander-0.12.0").unwrap();
    let traefik = document.find("traefik-27.0.2").unwrap();
    assert!(kommander < traefik);
    assert!(document.ends_with("```\n"));
}

#[test]
fn test_diagram_output_is_deterministic() {
    let temp = TempDir::new().unwrap();
    let input = write_records(&temp);

    let run = || clusterops().args(["diagram", "--stdout", "--input"]).arg(&input).output().unwrap().stdout;
    assert_eq!(run(), run());
}

#[test]
fn test_diagram_writes_default_path() {
    let temp = TempDir::new().unwrap();
    let input = write_records(&temp);

    clusterops()
        .current_dir(temp.path())
        .args(["diagram", "--input"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Block diagram written to"))
        .stdout(predicate::str::contains("4 apps, 1 root chains, 1 orphans"));

    let written = temp.path().join("docs/internal/CLUSTERAPP-BLOCK-DIAGRAM.md");
    let document = std::fs::read_to_string(written).unwrap();
    assert!(document.contains("cert-manager-1.14.2"));
}

#[test]
fn test_diagram_custom_output() {
    let temp = TempDir::new().unwrap();
    let input = write_records(&temp);
    let output = temp.path().join("out/diagram.md");

    clusterops()
        .args(["diagram", "--input"])
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();
    assert!(output.is_file());
}

#[test]
fn test_diagram_of_empty_listing() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("empty.txt");
    std::fs::write(&input, "").unwrap();

    let output = clusterops().args(["diagram", "--stdout", "--input"]).arg(&input).output().unwrap();
    assert!(output.status.success());
    let document = String::from_utf8(output.stdout).unwrap();
    assert!(!document.contains("Root Chain"));
    assert!(!document.contains("Orphaned"));
}

#[cfg(unix)]
#[test]
fn test_diagram_from_cluster() {
    let cluster = crate::common::kubescape_cluster();
    let saved = cluster.path().join("records.txt");

    cluster
        .command()
        .args(["diagram", "--save-records"])
        .arg(&saved)
        .assert()
        .success()
        .stderr(predicate::str::contains("Saved 4 records"));

    let document =
        std::fs::read_to_string(cluster.path().join("docs/internal/CLUSTERAPP-BLOCK-DIAGRAM.md")).unwrap();
    assert!(document.contains("### Root Chain 1: cert-manager-1.14.2"));

    let records = std::fs::read_to_string(saved).unwrap();
    assert!(records.contains("kommander-0.12.0|cert-manager, traefik\n"));
    assert!(records.starts_with("cert-manager-1.14.2|N/A\n"));
}
