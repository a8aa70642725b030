//! Fluent builder for kubectl invocations
//!
//! Every call clusterops makes to a cluster goes through [`KubectlCommand`],
//! which gives them the same kubeconfig handling, timeout, logging and error
//! mapping.
//!
//! # Examples
//!
//! ```rust,no_run
//! use clusterops_cli::kube::command_builder::KubectlCommand;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let names = KubectlCommand::new()
//!     .kubeconfig("/home/me/.kube/mgmt.kubeconfig")
//!     .args(["get", "vulnerabilitymanifestsummary", "--no-headers"])
//!     .args(["-o", "custom-columns=NAME:.metadata.name"])
//!     .namespace("kommander")
//!     .with_context("listing summaries")
//!     .execute_lines()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time::timeout;

use crate::constants::KUBECTL_DEFAULT_TIMEOUT;
use crate::core::OpsError;
use crate::utils::platform::get_kubectl_command;

/// Builder for a single kubectl invocation.
///
/// Defaults: the platform's `kubectl` from `PATH`, the ambient kubeconfig,
/// no namespace flag, and a 60 second timeout.
#[derive(Debug, Clone)]
pub struct KubectlCommand {
    /// Executable to run
    program: String,

    /// Arguments after the global flags (e.g. `["get", "clusterapps", "-A"]`)
    args: Vec<String>,

    /// Passed as `--kubeconfig=<path>` ahead of all other arguments
    kubeconfig: Option<PathBuf>,

    /// Passed as `-n <namespace>` after the arguments
    namespace: Option<String>,

    /// None disables the timeout
    timeout_duration: Option<Duration>,

    /// Prefix for log lines, usually the resource being fetched
    context: Option<String>,
}

impl Default for KubectlCommand {
    fn default() -> Self {
        Self {
            program: get_kubectl_command().to_string(),
            args: Vec::new(),
            kubeconfig: None,
            namespace: None,
            timeout_duration: Some(KUBECTL_DEFAULT_TIMEOUT),
            context: None,
        }
    }
}

/// Captured output of a successful kubectl invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KubectlOutput {
    pub stdout: String,
    pub stderr: String,
}

impl KubectlCommand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a different executable, such as a kubectl outside `PATH`.
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn kubeconfig(mut self, path: impl AsRef<Path>) -> Self {
        self.kubeconfig = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub const fn with_timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout_duration = duration;
        self
    }

    /// Label log lines for this invocation.
    ///
    /// ```text
    /// (clusterapps) Executing command: kubectl --kubeconfig=/k get clusterapps -A -o json
    /// ```
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Full argument list as passed to the executable.
    pub fn full_args(&self) -> Vec<String> {
        let mut full_args = Vec::with_capacity(self.args.len() + 3);
        if let Some(kubeconfig) = &self.kubeconfig {
            full_args.push(format!("--kubeconfig={}", kubeconfig.display()));
        }
        full_args.extend(self.args.iter().cloned());
        if let Some(namespace) = &self.namespace {
            full_args.push("-n".to_string());
            full_args.push(namespace.clone());
        }
        full_args
    }

    /// Verb and resource kind, e.g. `get clusterapps`.
    pub fn operation(&self) -> String {
        let words: Vec<&str> = self
            .args
            .iter()
            .map(String::as_str)
            .filter(|arg| !arg.starts_with('-'))
            .take(2)
            .collect();
        if words.is_empty() {
            "unknown".to_string()
        } else {
            words.join(" ")
        }
    }

    fn log_prefix(&self) -> String {
        self.context.as_ref().map(|ctx| format!("({ctx}) ")).unwrap_or_default()
    }

    /// Run the command and capture its output.
    ///
    /// # Errors
    ///
    /// - [`OpsError::KubectlNotFound`] when the executable cannot be spawned
    ///   because it does not exist
    /// - [`OpsError::KubectlCommandError`] on a non-zero exit or a timeout
    pub async fn execute(self) -> Result<KubectlOutput> {
        let start = Instant::now();
        let full_args = self.full_args();
        let operation = self.operation();
        let prefix = self.log_prefix();

        tracing::debug!(
            target: "kubectl",
            "{}Executing command: {} {}",
            prefix,
            self.program,
            full_args.join(" ")
        );

        let mut cmd = Command::new(&self.program);
        cmd.args(&full_args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        let spawn_result = match self.timeout_duration {
            Some(duration) => match timeout(duration, cmd.output()).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        target: "kubectl",
                        "{}Command timed out after {} seconds: {} {}",
                        prefix,
                        duration.as_secs(),
                        self.program,
                        full_args.join(" ")
                    );
                    return Err(OpsError::KubectlCommandError {
                        operation,
                        stderr: format!(
                            "kubectl timed out after {} seconds. The API server may be unreachable \
                            or the request too large.\n\
                            Try running the command manually: {} {}",
                            duration.as_secs(),
                            self.program,
                            full_args.join(" ")
                        ),
                    }
                    .into());
                }
            },
            None => cmd.output().await,
        };

        let output = match spawn_result {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(target: "kubectl", "{} could not be spawned: {}", self.program, e);
                return Err(OpsError::KubectlNotFound.into());
            }
            Err(e) => {
                return Err(e)
                    .context(format!("Failed to execute {} {}", self.program, full_args.join(" ")));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            tracing::debug!(
                target: "kubectl",
                "{}Command failed with exit code: {:?}",
                prefix,
                output.status.code()
            );
            if !stderr.is_empty() {
                tracing::debug!(target: "kubectl", "{}Error: {}", prefix, stderr.trim());
            }
            return Err(OpsError::KubectlCommandError {
                operation,
                stderr: if stderr.trim().is_empty() { stdout } else { stderr },
            }
            .into());
        }

        if !stderr.trim().is_empty() {
            tracing::debug!(target: "kubectl", "{}{}", prefix, stderr.trim());
        }
        tracing::trace!(target: "kubectl", "{}Received {} bytes on stdout", prefix, stdout.len());

        let elapsed = start.elapsed();
        if elapsed.as_secs() > 1 {
            tracing::info!(
                target: "kubectl::perf",
                "{}kubectl {} took {:.2}s",
                prefix,
                operation,
                elapsed.as_secs_f64()
            );
        } else if elapsed.as_millis() > 100 {
            tracing::debug!(
                target: "kubectl::perf",
                "{}kubectl {} took {}ms",
                prefix,
                operation,
                elapsed.as_millis()
            );
        }

        Ok(KubectlOutput {
            stdout,
            stderr,
        })
    }

    /// Run the command and return the non-empty, trimmed lines of stdout.
    pub async fn execute_lines(self) -> Result<Vec<String>> {
        let output = self.execute().await?;
        Ok(output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Run the command and deserialize stdout as JSON.
    ///
    /// # Errors
    ///
    /// Besides the errors of [`execute`](Self::execute), returns
    /// [`OpsError::ResourceParseError`] when stdout does not deserialize.
    pub async fn execute_json<T: DeserializeOwned>(self) -> Result<T> {
        let operation = self.operation();
        let output = self.execute().await?;
        serde_json::from_str(&output.stdout).map_err(|e| {
            OpsError::ResourceParseError {
                resource: operation,
                reason: e.to_string(),
            }
            .into()
        })
    }
}

// Shorthands for the kubectl verbs clusterops uses

impl KubectlCommand {
    /// Append `-A`.
    pub fn all_namespaces(self) -> Self {
        self.arg("-A")
    }

    /// Append `-o json`.
    pub fn json_output(self) -> Self {
        self.args(["-o", "json"])
    }
}
