//! clusterops CLI entry point.
//!
//! Parses arguments, sets up logging, runs the command and turns any error
//! into a colored message with a suggestion and exit code 1.

use anyhow::Result;
use clap::Parser;
use clusterops_cli::cli::{Cli, CliConfig};
use clusterops_cli::core::user_friendly_error;

fn main() {
    let cli = Cli::parse();
    let config = cli.build_config();

    // SAFETY: single-threaded here; the runtime starts in `run`.
    unsafe { config.apply_to_env() };

    tracing_subscriber::fmt()
        .with_env_filter(config.env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    if let Err(e) = run(cli, config) {
        user_friendly_error(e).display();
        std::process::exit(1);
    }
}

#[tokio::main]
async fn run(cli: Cli, config: CliConfig) -> Result<()> {
    cli.execute_with_config(config).await
}
