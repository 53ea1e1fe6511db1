//! Artifact acquisition engine
//!
//! The pipeline runs one direction: manifest entries go through the strategy
//! dispatcher, which resolves a source via the candidate resolver, transport,
//! or firmware locator; the digest verifier then accepts or rejects the
//! result and records a sidecar.
//!
//! - **http**: one shared HTTP client, atomic download-to-destination
//! - **digest**: streaming SHA-256, verification, `.sha256` sidecars
//! - **candidates**: ordered URL fallback with verify-or-discard
//! - **firmware**: host firmware directories and distro package fallback
//! - **github**: release asset lookup via the GitHub API
//! - **strategy**: per-type dispatch and upstream URL quirks
//! - **driver**: the per-manifest acquisition loop

pub mod candidates;
pub mod digest;
pub mod driver;
pub mod error;
pub mod firmware;
pub mod fs_utils;
pub mod github;
pub mod http;
pub mod strategy;

pub use candidates::try_candidates;
pub use digest::{sha256_file, verify, verify_and_record};
pub use driver::{FetchContext, run};
pub use error::FetchError;
pub use firmware::FirmwareLocator;
pub use http::HttpClient;
pub use strategy::SourceRules;
