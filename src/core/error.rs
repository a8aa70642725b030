//! Error handling for clusterops
//!
//! This module provides the error types and user-friendly error reporting used by
//! every clusterops command. The error system follows two principles:
//! 1. **Strongly-typed errors** for precise error handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`OpsError`] - Enumerated error types for all failure cases in clusterops
//! - [`ErrorContext`] - Wrapper that adds user-friendly messages and suggestions
//!
//! # Error Categories
//!
//! - **kubectl**: [`OpsError::KubectlNotFound`], [`OpsError::KubectlCommandError`]
//! - **Cluster selection**: [`OpsError::ClusterNotConfigured`], [`OpsError::KubeconfigNotFound`]
//! - **Payloads**: [`OpsError::ResourceParseError`]
//! - **Configuration**: [`OpsError::ConfigError`]
//! - **File System**: [`OpsError::FileSystemError`]
//!
//! The dependency graph and diagram code never fails; only the code that talks to
//! `kubectl`, reads configuration, or writes reports produces these errors.
//!
//! # Examples
//!
//! ```rust,no_run
//! use clusterops_cli::core::{OpsError, user_friendly_error};
//!
//! let error = anyhow::Error::from(OpsError::KubectlNotFound);
//! let ctx = user_friendly_error(error);
//! ctx.display(); // Shows colored error with suggestions
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for clusterops operations
///
/// Each variant describes one failure mode and carries the details needed to
/// build an actionable message for the operator.
#[derive(Error, Debug, Clone)]
pub enum OpsError {
    /// A kubectl invocation exited with a non-zero status or timed out
    ///
    /// # Fields
    /// - `operation`: The kubectl verb and resource (e.g., "get clusterapps")
    /// - `stderr`: The error output from kubectl
    #[error("kubectl operation failed: {operation}")]
    KubectlCommandError {
        /// The kubectl operation that failed
        operation: String,
        /// The error output from the kubectl command
        stderr: String,
    },

    /// kubectl executable not found in PATH
    #[error("kubectl is not installed or not found in PATH")]
    KubectlNotFound,

    /// The kubeconfig file selected for a cluster does not exist
    #[error("Kubeconfig not found: {path}")]
    KubeconfigNotFound {
        /// The resolved kubeconfig path
        path: String,
    },

    /// No cluster profile with the requested name
    #[error("Cluster '{name}' is not configured")]
    ClusterNotConfigured {
        /// Name of the requested cluster profile
        name: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// A Kubernetes resource payload did not have the expected shape
    #[error("Could not parse {resource}: {reason}")]
    ResourceParseError {
        /// The resource kind or name being parsed
        resource: String,
        /// What was wrong with the payload
        reason: String,
    },

    /// File system error
    #[error("File system error: {operation}")]
    FileSystemError {
        /// The operation that failed
        operation: String,
        /// The path involved
        path: String,
    },

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

/// Error context wrapper that provides user-friendly error information
///
/// `ErrorContext` wraps an [`OpsError`] and adds an optional suggestion and
/// details. When displayed in a terminal:
/// 1. **Error**: The main error message in red
/// 2. **Details**: Additional context in yellow (optional)
/// 3. **Suggestion**: Actionable steps in green (optional)
///
/// # Examples
///
/// ```rust,no_run
/// use clusterops_cli::core::{OpsError, ErrorContext};
///
/// let context = ErrorContext::new(OpsError::KubectlNotFound)
///     .with_suggestion("Install kubectl")
///     .with_details("clusterops shells out to kubectl for every cluster query");
///
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: OpsError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: OpsError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes [`OpsError`] variants (tailored suggestions), [`std::io::Error`]
/// kinds and TOML/JSON parse failures. Anything else is shown with its full
/// cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(ctx) = error.downcast_ref::<ErrorContext>() {
        return ErrorContext {
            error: ctx.error.clone(),
            suggestion: ctx.suggestion.clone(),
            details: ctx.details.clone(),
        };
    }

    if let Some(ops_error) = error.downcast_ref::<OpsError>() {
        return create_error_context(ops_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(OpsError::FileSystemError {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                })
                .with_suggestion("Check ownership and permissions of the output directory")
                .with_details("clusterops could not read or write a file it needed");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(OpsError::FileSystemError {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(OpsError::ConfigError {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax in your clusterops config file")
        .with_details("Cluster profiles live under [clusters.<name>] with a 'kubeconfig' key");
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(OpsError::Other {
        message,
    })
}

/// Map each [`OpsError`] variant to an [`ErrorContext`] with suggestions.
fn create_error_context(error: OpsError) -> ErrorContext {
    match &error {
        OpsError::KubectlNotFound => ErrorContext::new(OpsError::KubectlNotFound)
            .with_suggestion("Install kubectl (https://kubernetes.io/docs/tasks/tools/) or set 'kubectl' in the clusterops config")
            .with_details("clusterops queries clusters by running kubectl with the selected kubeconfig"),

        OpsError::KubectlCommandError { operation, stderr } => {
            let suggestion = if stderr.contains("the server doesn't have a resource type") {
                "The custom resource is not installed on this cluster. Check that the operator providing it is deployed"
            } else if stderr.contains("Unauthorized") || stderr.contains("Forbidden") {
                "Your kubeconfig credentials were rejected. Refresh them and retry"
            } else if stderr.contains("timed out") {
                "The cluster did not answer in time. Check connectivity or raise 'kubectl_timeout_secs'"
            } else {
                "Run the kubectl command manually with the same kubeconfig to see the full error"
            };
            ErrorContext::new(OpsError::KubectlCommandError {
                operation: operation.clone(),
                stderr: stderr.clone(),
            })
            .with_suggestion(suggestion)
            .with_details(stderr.trim().to_string())
        }

        OpsError::KubeconfigNotFound { path } => ErrorContext::new(OpsError::KubeconfigNotFound {
            path: path.clone(),
        })
            .with_suggestion("Pass --kubeconfig or point the cluster profile at an existing kubeconfig file")
            .with_details(format!("No file exists at {path}")),

        OpsError::ClusterNotConfigured { name } => ErrorContext::new(OpsError::ClusterNotConfigured {
            name: name.clone(),
        })
            .with_suggestion(format!(
                "Add a [clusters.{name}] section with a 'kubeconfig' key to ~/.clusterops/config.toml"
            )),

        OpsError::ResourceParseError { resource, reason } => ErrorContext::new(OpsError::ResourceParseError {
            resource: resource.clone(),
            reason: reason.clone(),
        })
            .with_suggestion("Check that the cluster runs a supported version of the operator that owns this resource"),

        _ => ErrorContext::new(error.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(OpsError::KubectlNotFound.to_string(), "kubectl is not installed or not found in PATH");

        let error = OpsError::KubectlCommandError {
            operation: "get clusterapps".to_string(),
            stderr: "connection refused".to_string(),
        };
        assert_eq!(error.to_string(), "kubectl operation failed: get clusterapps");

        let error = OpsError::ClusterNotConfigured {
            name: "edge".to_string(),
        };
        assert_eq!(error.to_string(), "Cluster 'edge' is not configured");
    }

    #[test]
    fn test_error_context_display() {
        let ctx = ErrorContext::new(OpsError::KubectlNotFound).with_suggestion("Install kubectl");

        let display = format!("{ctx}");
        assert!(display.contains("kubectl is not installed"));
        assert!(display.contains("Suggestion: Install kubectl"));
    }

    #[test]
    fn test_user_friendly_error_kubectl_not_found() {
        let ctx = user_friendly_error(anyhow::Error::from(OpsError::KubectlNotFound));
        assert!(matches!(ctx.error, OpsError::KubectlNotFound));
        assert!(ctx.suggestion.unwrap().contains("Install kubectl"));
        assert!(ctx.details.is_some());
    }

    #[test]
    fn test_user_friendly_error_missing_crd() {
        let error = OpsError::KubectlCommandError {
            operation: "get clusterapps".to_string(),
            stderr: "error: the server doesn't have a resource type \"clusterapps\"".to_string(),
        };
        let ctx = user_friendly_error(anyhow::Error::from(error));
        assert!(ctx.suggestion.unwrap().contains("custom resource is not installed"));
    }

    #[test]
    fn test_user_friendly_error_keeps_existing_context() {
        let ctx = ErrorContext::new(OpsError::KubectlNotFound).with_suggestion("custom");
        let converted = user_friendly_error(anyhow::Error::new(ctx));
        assert_eq!(converted.suggestion.as_deref(), Some("custom"));
    }

    #[test]
    fn test_user_friendly_error_generic_includes_chain() {
        let error = anyhow::anyhow!("root cause").context("Failed to write report");
        let ctx = user_friendly_error(error);
        match ctx.error {
            OpsError::Other {
                message,
            } => {
                assert!(message.contains("Failed to write report"));
                assert!(message.contains("Caused by:"));
                assert!(message.contains("root cause"));
            }
            other => panic!("Expected Other error, got {other:?}"),
        }
    }

    #[test]
    fn test_user_friendly_error_toml_syntax() {
        let parse_error = toml::from_str::<toml::Value>("invalid = toml {").unwrap_err();
        let error = anyhow::Error::from(parse_error).context("Failed to parse config from config.toml");
        let ctx = user_friendly_error(error);
        assert!(matches!(ctx.error, OpsError::ConfigError { .. }));
        assert!(ctx.suggestion.unwrap().contains("TOML syntax"));
    }

    #[test]
    fn test_error_clone() {
        let error = OpsError::KubeconfigNotFound {
            path: "/tmp/edge.conf".to_string(),
        };
        assert_eq!(error.clone().to_string(), error.to_string());
    }
}
