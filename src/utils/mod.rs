//! Platform helpers, file writes and terminal progress indicators.
//!
//! - [`fs`] - atomic document writes
//! - [`platform`] - home directory, kubectl lookup and path expansion
//! - [`progress`] - spinners and bars that respect `CLUSTEROPS_NO_PROGRESS`

pub mod fs;
pub mod platform;
pub mod progress;

pub use fs::{atomic_write, ensure_dir};
pub use platform::{command_exists, get_home_dir, get_kubectl_command, is_windows, resolve_path};
pub use progress::{ProgressBar, spinner_with_message};
