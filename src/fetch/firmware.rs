//! Host and distro-package firmware fallback
//!
//! Firmware blobs frequently already exist on the build host, or ship in the
//! distribution's linux-firmware package; both are faster than the upstream
//! git mirror and avoid its rate limits. The locator searches the well-known
//! host firmware directories first, then downloads and extracts the distro
//! package into a scoped temporary directory. Package-step failures are
//! reported as not-found rather than errors; the caller still has the
//! upstream mirror as a source of last resort.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::output;

use super::digest;
use super::error::FetchError;
use super::fs_utils;

/// Firmware subtrees searched both on the host and inside the extracted
/// package (root-relative and usr-prefixed layouts).
const FIRMWARE_SUBTREES: [&str; 2] = ["lib/firmware", "usr/lib/firmware"];

/// Searches local firmware directories, then the distro firmware package.
pub struct FirmwareLocator {
    host_roots: Vec<PathBuf>,
    package_fallback: bool,
}

impl Default for FirmwareLocator {
    fn default() -> Self {
        FirmwareLocator {
            host_roots: vec![
                PathBuf::from("/lib/firmware"),
                PathBuf::from("/usr/lib/firmware"),
            ],
            package_fallback: true,
        }
    }
}

impl FirmwareLocator {
    /// A locator restricted to the given directories, with the package
    /// fallback disabled. Used by tests and offline environments.
    pub fn host_only(roots: Vec<PathBuf>) -> Self {
        FirmwareLocator {
            host_roots: roots,
            package_fallback: false,
        }
    }

    /// Find a file matching any of `patterns`, verify it if a digest is
    /// expected, and copy it to `dest`. Returns whether a verified match was
    /// found; mismatched or non-regular candidates are skipped, never
    /// accepted.
    pub fn locate(
        &self,
        patterns: &[String],
        dest: &Path,
        expected: Option<&str>,
    ) -> Result<bool, FetchError> {
        for root in &self.host_roots {
            if let Some(found) = search_tree(root, patterns, expected) {
                output::detail(&format!("using firmware from host: {}", found.display()));
                fs_utils::copy_file(&found, dest)?;
                return Ok(true);
            }
        }

        if !self.package_fallback {
            return Ok(false);
        }
        self.locate_in_package(patterns, dest, expected)
    }

    /// Download and extract the linux-firmware package, then search the same
    /// subtrees inside it. The extraction directory lives in a `TempDir` and
    /// is removed on every exit path.
    fn locate_in_package(
        &self,
        patterns: &[String],
        dest: &Path,
        expected: Option<&str>,
    ) -> Result<bool, FetchError> {
        let tmp = tempfile::Builder::new()
            .prefix("linux-firmware-")
            .tempdir()?;

        // Best-effort index refresh; a stale index still often resolves.
        Command::new("apt-get")
            .arg("update")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .ok();

        let download = Command::new("apt-get")
            .args(["download", "linux-firmware"])
            .current_dir(tmp.path())
            .output();
        match download {
            Ok(out) if out.status.success() => {}
            Ok(out) => {
                output::warning(&format!(
                    "failed to download linux-firmware package: {}",
                    String::from_utf8_lossy(&out.stderr).trim()
                ));
                return Ok(false);
            }
            Err(e) => {
                output::warning(&format!("failed to download linux-firmware package: {}", e));
                return Ok(false);
            }
        }

        let debs = fs_utils::glob_under(tmp.path(), "linux-firmware_*.deb");
        let Some(deb) = debs.first() else {
            output::warning(&format!(
                "no linux-firmware package found in {}",
                tmp.path().display()
            ));
            return Ok(false);
        };

        let extract_dir = tmp.path().join("extract");
        std::fs::create_dir_all(&extract_dir)?;
        let extract = Command::new("dpkg-deb")
            .arg("-x")
            .arg(deb)
            .arg(&extract_dir)
            .output();
        match extract {
            Ok(out) if out.status.success() => {}
            Ok(out) => {
                output::warning(&format!(
                    "failed to extract linux-firmware package: {}",
                    String::from_utf8_lossy(&out.stderr).trim()
                ));
                return Ok(false);
            }
            Err(e) => {
                output::warning(&format!("failed to extract linux-firmware package: {}", e));
                return Ok(false);
            }
        }

        for subtree in FIRMWARE_SUBTREES {
            let base = extract_dir.join(subtree);
            if let Some(found) = search_tree(&base, patterns, expected) {
                output::detail(&format!(
                    "using firmware from downloaded package: {}",
                    found.display()
                ));
                fs_utils::copy_file(&found, dest)?;
                return Ok(true);
            }
        }

        Ok(false)
    }
}

/// Glob each pattern under `base`; the first regular file that passes the
/// optional digest check wins.
fn search_tree(base: &Path, patterns: &[String], expected: Option<&str>) -> Option<PathBuf> {
    if !base.exists() {
        return None;
    }
    for pattern in patterns {
        for candidate in fs_utils::glob_under(base, pattern) {
            if !candidate.is_file() {
                continue;
            }
            if let Some(expected) = expected {
                match digest::sha256_file(&candidate) {
                    Ok(actual) if actual == expected.to_lowercase() => {}
                    Ok(_) => {
                        output::warning(&format!(
                            "host firmware {} hash mismatch, continuing fallback",
                            candidate.display()
                        ));
                        continue;
                    }
                    Err(e) => {
                        output::warning(&format!(
                            "cannot hash candidate {}: {}",
                            candidate.display(),
                            e
                        ));
                        continue;
                    }
                }
            }
            return Some(candidate);
        }
    }
    None
}
