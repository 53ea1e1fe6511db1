//! Asset manifest loading and artifact descriptors
//!
//! The manifest is a JSON file with an `artifacts` array. Each entry names
//! one artifact, where to put it, the SHA-256 it must hash to, and a `type`
//! tag selecting the acquisition strategy. The tag is a closed enum so the
//! dispatcher's type-specific field access is checked at compile time; an
//! unknown `type` is a configuration error surfaced at load time.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::fetch::error::FetchError;

/// Top-level manifest: an ordered list of artifact descriptors.
#[derive(Debug, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
}

/// One artifact to acquire, as declared in the manifest.
///
/// `destination` is relative to the fetch root; `sha256` is the digest the
/// final file must match.
#[derive(Debug, Clone, Deserialize)]
pub struct Artifact {
    pub name: String,
    pub destination: PathBuf,
    pub sha256: String,
    #[serde(flatten)]
    pub source: Source,
}

/// Type-specific acquisition fields, keyed by the manifest's `type` tag.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Source {
    /// A named asset attached to a GitHub release.
    Github {
        repo: String,
        tag: String,
        asset: String,
    },
    /// A file served from the upstream linux-firmware git web interface.
    KernelFirmware { url: String },
}

impl Source {
    /// The manifest tag string, used for CLI filter matching.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Github { .. } => "github",
            Self::KernelFirmware { .. } => "kernel_firmware",
        }
    }
}

impl Manifest {
    /// Load and validate a manifest file.
    ///
    /// A missing file, malformed JSON, an unknown artifact type, or an empty
    /// artifact list are all fatal here, before any artifact is processed.
    pub fn load(path: &Path) -> Result<Manifest, FetchError> {
        if !path.exists() {
            return Err(FetchError::Manifest(format!(
                "missing assets manifest: {}",
                path.display()
            )));
        }
        let data = std::fs::read_to_string(path)?;
        let manifest: Manifest = serde_json::from_str(&data)
            .map_err(|e| FetchError::Manifest(format!("{}: {}", path.display(), e)))?;
        if manifest.artifacts.is_empty() {
            return Err(FetchError::Manifest(
                "no artifacts defined in manifest".to_string(),
            ));
        }
        Ok(manifest)
    }
}
