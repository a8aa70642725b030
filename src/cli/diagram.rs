//! `clusterops diagram`: ClusterApp dependency block diagram.
//!
//! Records come from the cluster (`kubectl get clusterapps -A -o json`) or
//! from a saved records file, so a diagram can be regenerated offline:
//!
//! ```bash
//! clusterops diagram --cluster mgmt --save-records apps.txt
//! clusterops diagram --input apps.txt --stdout
//! ```

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::common::ClusterContext;
use crate::config::GlobalConfig;
use crate::constants::DEFAULT_DIAGRAM_PATH;
use crate::diagram::BlockDiagram;
use crate::graph::DependencyRecord;
use crate::kube::cluster_apps::{fetch_cluster_apps, load_records, save_records};
use crate::utils::{atomic_write, spinner_with_message};

/// Generate the ClusterApp dependency block diagram.
#[derive(Args, Debug)]
pub struct DiagramCommand {
    /// Cluster profile to read ClusterApps from
    #[arg(long, conflicts_with = "input")]
    cluster: Option<String>,

    /// Kubeconfig to use instead of the profile's
    #[arg(long, conflicts_with = "input")]
    kubeconfig: Option<PathBuf>,

    /// Read `<identifier>|<dependencies>` records from a file instead of the cluster
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Also save the records used for the diagram
    #[arg(long, value_name = "FILE")]
    save_records: Option<PathBuf>,

    /// Where to write the markdown diagram
    #[arg(short, long, default_value = DEFAULT_DIAGRAM_PATH)]
    output: PathBuf,

    /// Print the diagram to stdout instead of writing a file
    #[arg(long)]
    stdout: bool,
}

impl DiagramCommand {
    pub async fn execute(self, config: &GlobalConfig) -> Result<()> {
        let records = self.collect_records(config).await?;

        if let Some(path) = &self.save_records {
            save_records(path, &records).await?;
            eprintln!("{} Saved {} records to {}", "✓".green(), records.len(), path.display());
        }

        let diagram = BlockDiagram::new(&records);
        let document = diagram.render();

        if self.stdout {
            print!("{document}");
            return Ok(());
        }

        atomic_write(&self.output, document.as_bytes())
            .with_context(|| format!("Failed to write diagram: {}", self.output.display()))?;

        println!(
            "{} Block diagram written to {}",
            "✓".green(),
            self.output.display().to_string().bold()
        );
        println!("  {}", summary_line(&diagram));
        Ok(())
    }

    async fn collect_records(&self, config: &GlobalConfig) -> Result<Vec<DependencyRecord>> {
        if let Some(input) = &self.input {
            let records = load_records(input).await?;
            tracing::debug!("Loaded {} records from {}", records.len(), input.display());
            return Ok(records);
        }

        let cluster = ClusterContext::resolve(config, self.cluster.as_deref(), self.kubeconfig.as_deref())?;
        let spinner = spinner_with_message(format!("Fetching ClusterApps from {}...", cluster.display_name));
        let result = fetch_cluster_apps(&cluster.kubectl).await;
        spinner.finish_and_clear();
        result
    }
}

/// One-line counts for the written diagram. Apps caught in a dependency
/// cycle have no root above them, so they land among the orphans.
fn summary_line(diagram: &BlockDiagram) -> String {
    let partition = diagram.partition();
    let mut line = format!(
        "{} apps, {} root chains, {} orphans",
        diagram.graph().len(),
        partition.chains.len(),
        partition.orphans.len()
    );
    if diagram.graph().has_cycle() {
        line.push_str(", dependency cycle detected");
    }
    line
}
