//! Common filesystem utilities shared by the acquisition components.

use std::io;
use std::path::{Path, PathBuf};

/// Ensure a file's parent directory exists.
///
/// Creates the parent directory (and all ancestors) if it doesn't exist.
pub fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Copy a file, creating parent directories as needed.
pub fn copy_file(src: &Path, dest: &Path) -> io::Result<u64> {
    ensure_parent_dir(dest)?;
    std::fs::copy(src, dest)
}

/// Expand a glob pattern under a base directory.
///
/// Returns an empty Vec on no matches; an invalid pattern also yields no
/// matches (the caller's patterns come from a fixed table).
pub fn glob_under(base: &Path, pattern: &str) -> Vec<PathBuf> {
    let full = format!("{}/{}", base.display(), pattern);
    match glob::glob(&full) {
        Ok(paths) => paths.filter_map(|r| r.ok()).collect(),
        Err(_) => Vec::new(),
    }
}
