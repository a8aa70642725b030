//! Core types shared by every clusterops command
//!
//! This module holds the error system: [`OpsError`] for precise handling in code
//! and [`ErrorContext`]/[`user_friendly_error`] for presenting failures to the
//! operator with details and suggestions.
//!
//! # Examples
//!
//! ```rust
//! use clusterops_cli::core::{OpsError, user_friendly_error};
//! use anyhow::Result;
//!
//! fn example_operation() -> Result<String> {
//!     Err(OpsError::KubectlNotFound.into())
//! }
//!
//! if let Err(e) = example_operation() {
//!     let friendly = user_friendly_error(e);
//!     assert!(friendly.suggestion.is_some());
//! }
//! ```

pub mod error;

pub use error::{ErrorContext, OpsError, user_friendly_error};
