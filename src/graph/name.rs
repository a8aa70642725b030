//! Version-suffix stripping for ClusterApp identifiers.
//!
//! ClusterApps are usually named `<app>-<major>.<minor>.<patch>[suffix]`, while
//! dependency annotations refer to the unversioned `<app>`. [`base_name`] maps
//! the former onto the latter so both spellings resolve to the same family.

use regex::Regex;
use std::sync::LazyLock;

/// Matches `-N.N.N` and everything after it up to the end of the identifier.
static VERSION_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-\d+\.\d+\.\d+.*$").expect("version suffix pattern is valid"));

/// Returns the identifier with its semantic-version suffix removed.
///
/// The cut happens at the leftmost position where `-N.N.N` starts, so an
/// identifier carrying several version-like groups loses all of them.
/// Identifiers without such a suffix are returned unchanged.
///
/// # Examples
///
/// ```rust
/// use clusterops_cli::graph::base_name;
///
/// assert_eq!(base_name("cert-manager-1.14.2"), "cert-manager");
/// assert_eq!(base_name("kube-prometheus-stack-61.3.2-d2iq"), "kube-prometheus-stack");
/// assert_eq!(base_name("cert-manager"), "cert-manager");
/// ```
#[must_use]
pub fn base_name(identifier: &str) -> &str {
    match VERSION_SUFFIX.find(identifier) {
        Some(m) => &identifier[..m.start()],
        None => identifier,
    }
}
