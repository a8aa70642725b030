//! Command-line interface for clusterops.
//!
//! # Available Commands
//!
//! - `diagram` - render the ClusterApp dependency block diagram
//! - `cves` - console and markdown CVE report from Kubescape results
//! - `extract-cves` - CVE findings as a JSON array on stdout
//!
//! # Global Options
//!
//! ```bash
//! clusterops --verbose diagram --cluster mgmt
//! clusterops --quiet --no-progress extract-cves --severity critical
//! clusterops --config ./clusters.toml cves high workload1
//! ```
//!
//! `--verbose` and `--quiet` set the log filter (`debug` and `error`);
//! without either, `RUST_LOG` decides and defaults to `warn`. Logs go to
//! stderr so stdout stays clean for diagrams and JSON.

mod common;
mod cves;
mod diagram;
mod extract;

pub use common::{ClusterContext, parse_namespaces};
pub use cves::CvesCommand;
pub use diagram::DiagramCommand;
pub use extract::{ExtractCommand, findings_json};

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::GlobalConfig;
use crate::constants::NO_PROGRESS_ENV;

/// Process-wide settings derived from the global flags.
///
/// Kept separate from [`Cli`] so tests can inspect the effect of the flags
/// without touching the environment.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Explicit log filter; `None` defers to `RUST_LOG`.
    pub log_level: Option<String>,

    /// Hide spinners and progress bars.
    pub no_progress: bool,

    /// Global config file to load instead of the default location.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Log filter for the tracing subscriber.
    pub fn env_filter(&self) -> EnvFilter {
        match &self.log_level {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        }
    }

    /// Export settings that other parts of clusterops read from the environment.
    ///
    /// Sets `CLUSTEROPS_NO_PROGRESS=1` when progress output is disabled.
    ///
    /// # Safety
    ///
    /// Mutates the process environment. Call only while no other thread can
    /// read or write it, i.e. before the async runtime starts.
    pub unsafe fn apply_to_env(&self) {
        if self.no_progress {
            // SAFETY: upheld by the caller.
            unsafe { std::env::set_var(NO_PROGRESS_ENV, "1") };
        }
    }
}

/// Operator tooling for Kubernetes clusters.
#[derive(Parser, Debug)]
#[command(
    name = "clusterops",
    about = "Operator tooling for Kubernetes clusters",
    version,
    long_about = "clusterops renders ClusterApp dependency diagrams and Kubescape CVE reports \
                  using kubectl and the kubeconfigs of named cluster profiles."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the global config file (default: ~/.clusterops/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disable spinners and progress bars
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the ClusterApp dependency block diagram
    Diagram(DiagramCommand),

    /// Scan a cluster for CVEs and write console and markdown reports
    Cves(CvesCommand),

    /// Print CVE findings as JSON
    #[command(name = "extract-cves")]
    ExtractCves(ExtractCommand),
}

impl Cli {
    /// Translate the global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        };

        CliConfig {
            log_level,
            no_progress: self.no_progress,
            config_path: self.config.clone(),
        }
    }

    /// Load the global config and run the selected command.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        let global = GlobalConfig::load_with_optional(config.config_path).await?;

        match self.command {
            Commands::Diagram(cmd) => cmd.execute(&global).await,
            Commands::Cves(cmd) => cmd.execute(&global).await,
            Commands::ExtractCves(cmd) => cmd.execute(&global).await,
        }
    }
}
