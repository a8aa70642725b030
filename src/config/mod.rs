//! Configuration for clusterops.
//!
//! A single user-wide TOML file holds named cluster profiles and kubectl
//! settings; see [`global`] for the format and the defaults used when the
//! file is absent.

pub mod global;

pub use global::{ClusterProfile, GlobalConfig, check_kubeconfig};
