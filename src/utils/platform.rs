//! Platform helpers: home directory, kubectl lookup and path expansion.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Whether the binary was built for Windows.
#[must_use]
pub const fn is_windows() -> bool {
    cfg!(windows)
}

/// The user's home directory.
///
/// # Examples
///
/// ```rust,no_run
/// use clusterops_cli::utils::platform::get_home_dir;
///
/// # fn example() -> anyhow::Result<()> {
/// let kube_dir = get_home_dir()?.join(".kube");
/// println!("{}", kube_dir.display());
/// # Ok(())
/// # }
/// ```
pub fn get_home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| {
        let platform_help = if is_windows() {
            "On Windows: Check that the USERPROFILE environment variable is set"
        } else {
            "On Unix/Linux: Check that the HOME environment variable is set"
        };
        anyhow::anyhow!("Could not determine home directory.\n\n{platform_help}")
    })
}

/// Default kubectl executable name for the current platform.
///
/// This is a bare name resolved through `PATH`; the global config may point
/// at a specific binary instead.
#[must_use]
pub const fn get_kubectl_command() -> &'static str {
    if is_windows() { "kubectl.exe" } else { "kubectl" }
}

/// Whether `cmd` resolves to an executable, either as a path or through `PATH`.
#[must_use]
pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}

/// Expand a leading `~/` and `$VAR`/`${VAR}` references in a path.
///
/// `~user` forms are rejected; undefined variables are an error.
///
/// # Examples
///
/// ```rust,no_run
/// use clusterops_cli::utils::platform::resolve_path;
///
/// # fn example() -> anyhow::Result<()> {
/// let kubeconfig = resolve_path("~/.kube/mgmt.kubeconfig")?;
/// let from_env = resolve_path("$HOME/.kube/config")?;
/// # Ok(())
/// # }
/// ```
pub fn resolve_path(path: &str) -> Result<PathBuf> {
    let expanded = if let Some(stripped) = path.strip_prefix("~/") {
        get_home_dir()?.join(stripped)
    } else if path == "~" {
        get_home_dir()?
    } else if path.starts_with('~') {
        return Err(anyhow::anyhow!(
            "Invalid path: {path}\n\n\
            Tilde expansion only supports '~/' for home directory.\n\
            Use '~/' followed by a relative path, like '~/.kube/config'"
        ));
    } else {
        PathBuf::from(path)
    };

    let path_str = expanded.to_string_lossy();
    let expanded_str = shellexpand::env(&path_str)
        .with_context(|| {
            format!(
                "Failed to expand environment variables in path: {path_str}\n\n\
                Common issues:\n\
                - Undefined environment variable (e.g., $UNDEFINED_VAR)\n\
                - Invalid variable syntax (use $VAR or ${{VAR}})"
            )
        })?
        .into_owned();

    Ok(PathBuf::from(expanded_str))
}
