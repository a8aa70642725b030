//! Integration test suite for clusterops
//!
//! These tests drive the `clusterops` binary end to end. No cluster is
//! needed: commands that query one get a scripted kubectl through a
//! temporary config file (see `clusterops_cli::test_utils::FakeKubectl`).
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! - **cli**: argument parsing, help and error presentation
//! - **cves**: console and markdown CVE reports, JSON extraction
//! - **diagram**: block diagram generation from files and clusters

mod cli;
mod common;
mod cves;
mod diagram;
