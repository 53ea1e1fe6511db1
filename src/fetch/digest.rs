//! Streaming SHA-256 verification and digest sidecars
//!
//! Digests are computed in fixed 1 MiB chunks so results are stable across
//! platforms and large blobs never sit in memory whole. A verified file gets
//! a `<file>.sha256` sidecar holding `"<digest>  <basename>\n"` — an audit
//! record of what was accepted, regenerated on every run and never read back.

use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::output;

use super::error::FetchError;

/// Chunk size for reading files during hashing (1 MiB)
const CHUNK_SIZE: usize = 1024 * 1024;

/// Compute the SHA-256 of a file as lowercase hex.
pub fn sha256_file(path: &Path) -> Result<String, FetchError> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Verify a file's SHA-256 against an expected value (case-insensitive).
pub fn verify(path: &Path, expected: &str) -> Result<(), FetchError> {
    let actual = sha256_file(path)?;
    if actual != expected.to_lowercase() {
        return Err(FetchError::DigestMismatch {
            path: path.to_path_buf(),
            actual,
            expected: expected.to_lowercase(),
        });
    }
    Ok(())
}

/// Verify a file and record its digest sidecar.
///
/// On success writes `<path>.sha256`; on mismatch the file itself is removed
/// before the error is returned, so a destination never holds content that
/// failed verification.
pub fn verify_and_record(path: &Path, expected: &str) -> Result<(), FetchError> {
    let actual = sha256_file(path)?;
    if actual != expected.to_lowercase() {
        std::fs::remove_file(path).ok();
        return Err(FetchError::DigestMismatch {
            path: path.to_path_buf(),
            actual,
            expected: expected.to_lowercase(),
        });
    }

    let basename = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    std::fs::write(sidecar_path(path), format!("{}  {}\n", actual, basename))?;
    output::detail(&format!("verified {}", basename));
    Ok(())
}

/// Sidecar path for a verified file: the full filename plus `.sha256`.
pub fn sidecar_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|s| s.to_owned()).unwrap_or_default();
    name.push(".sha256");
    path.with_file_name(name)
}
