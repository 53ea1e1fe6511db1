//! Acquisition error types.
//!
//! Per-candidate failures (a bad status, a digest mismatch) are caught and
//! logged where fallback is still possible; only exhaustion of every source
//! tier for an artifact propagates one of these out of the engine.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while acquiring artifacts.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("manifest error: {0}")]
    Manifest(String),

    #[error("failed to download {url}: HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("failed to download {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("sha256 mismatch for {}: {actual} != {expected}", .path.display())]
    DigestMismatch {
        path: PathBuf,
        actual: String,
        expected: String,
    },

    #[error("could not resolve {artifact}: {reason}")]
    Resolution { artifact: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Whether this is an HTTP 403, which triggers the git-web retry quirk.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, FetchError::HttpStatus { status: 403, .. })
    }
}
