//! ClusterApp listing.
//!
//! Each ClusterApp advertises its dependencies through an annotation. The
//! primary `apps.kommander.d2iq.io/dependencies` annotation wins when it is
//! non-empty; otherwise `apps.kommander.d2iq.io/required-dependencies` is
//! used; otherwise the app has no dependencies.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use super::{Kubectl, ObjectMeta, ResourceList};
use crate::constants::{DEPENDENCIES_ANNOTATION, REQUIRED_DEPENDENCIES_ANNOTATION};
use crate::graph::{DependencyRecord, parse_record_lines};

#[derive(Debug, Clone, Deserialize)]
pub struct ClusterApp {
    pub metadata: ObjectMeta,
}

impl ClusterApp {
    /// Dependency annotation text, or `""` when neither annotation is set.
    pub fn dependency_text(&self) -> &str {
        [DEPENDENCIES_ANNOTATION, REQUIRED_DEPENDENCIES_ANNOTATION]
            .into_iter()
            .filter_map(|key| self.metadata.annotation(key))
            .find(|text| !text.is_empty())
            .unwrap_or_default()
    }

    pub fn to_record(&self) -> DependencyRecord {
        DependencyRecord::new(self.metadata.name.clone(), self.dependency_text())
    }
}

/// Records for every ClusterApp in a listing, in listing order.
pub fn records_from_list(list: &ResourceList<ClusterApp>) -> Vec<DependencyRecord> {
    list.items.iter().map(ClusterApp::to_record).collect()
}

/// Run `kubectl get clusterapps -A -o json` and turn the result into records.
pub async fn fetch_cluster_apps(kubectl: &Kubectl) -> Result<Vec<DependencyRecord>> {
    let list: ResourceList<ClusterApp> = kubectl
        .command()
        .args(["get", "clusterapps"])
        .all_namespaces()
        .json_output()
        .with_context("clusterapps")
        .execute_json()
        .await?;

    let records = records_from_list(&list);
    tracing::info!("Fetched {} ClusterApps", records.len());
    Ok(records)
}

/// Write records in the `<identifier>|<dependency text>` line format.
pub async fn save_records(path: &Path, records: &[DependencyRecord]) -> Result<()> {
    let mut content = String::new();
    for record in records {
        content.push_str(&record.to_string());
        content.push('\n');
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write records file: {}", path.display()))?;
    tracing::debug!("Saved {} records to {}", records.len(), path.display());
    Ok(())
}

/// Read records written by [`save_records`] (or by hand).
pub async fn load_records(path: &Path) -> Result<Vec<DependencyRecord>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read records file: {}", path.display()))?;
    Ok(parse_record_lines(&content))
}
