//! Path containment checks for enumeration.
//!
//! Every candidate entry is resolved to its real location (symlinks
//! followed) and compared against the real location of the enumeration root.
//! Anything that resolves outside the root is dropped, so a symlink planted
//! in a log directory cannot pull unrelated files into a public upload.

use anyhow::{Context, Result};
use log::debug;
use std::path::{Path, PathBuf};

/// Resolve the real, absolute location of an enumeration root.
///
/// A leading `~` is expanded from `$HOME` before canonicalizing.
pub fn canonical_root(path: &Path) -> Result<PathBuf> {
    let expanded = expand_home(path);
    expanded
        .canonicalize()
        .with_context(|| format!("Failed to canonicalize root {}", path.display()))
}

/// Check whether `path` resolves to a location inside `root`.
///
/// `root` must already be canonical. Containment is decided per path
/// component, so `/logs-other` is not considered inside `/logs`. Paths that
/// cannot be resolved (dangling symlinks, files removed mid-walk) are
/// treated as outside the tree.
pub fn path_in_tree(root: &Path, path: &Path) -> bool {
    match path.canonicalize() {
        Ok(real) if real.starts_with(root) => true,
        Ok(real) => {
            debug!(
                "Skipping path outside root: {} -> {}",
                path.display(),
                real.display()
            );
            false
        }
        Err(e) => {
            debug!("Skipping unresolvable path {}: {}", path.display(), e);
            false
        }
    }
}

fn expand_home(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    path.to_path_buf()
}
