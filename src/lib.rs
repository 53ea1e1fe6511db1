//! Manifest-driven build asset fetcher
//!
//! Resolves and downloads the external artifacts a board image build needs
//! (firmware blobs, bootloader images, kernel release bundles) from a JSON
//! manifest, trying a prioritized list of sources per artifact and accepting
//! a download only once its SHA-256 digest matches the manifest.
//!
//! # Example manifest entry
//!
//! ```json
//! {
//!     "name": "mt7996_dsp",
//!     "type": "kernel_firmware",
//!     "url": "https://git.kernel.org/.../mt7996_dsp.bin",
//!     "destination": "firmware/mt7996_dsp.bin",
//!     "sha256": "0f00f6bd..."
//! }
//! ```
//!
//! # Acquisition order
//!
//! Per artifact, sources are tried strictly in order and the first candidate
//! that both downloads and verifies wins:
//!
//! - `github` artifacts resolve a release asset URL through the GitHub API
//!   and download it directly.
//! - `kernel_firmware` artifacts go through up to three tiers: a per-artifact
//!   candidate table (for blobs that moved between upstream directory
//!   layouts), the local firmware directories or the distro firmware package,
//!   and finally the declared URL itself.
//!
//! Every accepted file gets a `<file>.sha256` sidecar recording the digest
//! that was verified.

pub mod fetch;
pub mod manifest;
pub mod output;

pub use fetch::driver::{FetchContext, run};
pub use fetch::error::FetchError;
