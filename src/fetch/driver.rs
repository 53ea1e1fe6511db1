//! The acquisition loop
//!
//! Walks the manifest in declaration order, applies the CLI filter set,
//! dispatches each artifact to its strategy, and accepts the result only
//! after verification. One unresolvable artifact aborts the whole run; there
//! is no partial success.

use std::path::PathBuf;

use crate::manifest::{Artifact, Manifest};
use crate::output;

use super::digest;
use super::error::FetchError;
use super::firmware::FirmwareLocator;
use super::github;
use super::http::HttpClient;
use super::strategy::{self, SourceRules};

/// Everything the acquisition run needs, constructed once at startup and
/// passed by reference; no component reaches for global state.
pub struct FetchContext {
    /// Base directory artifact destinations are resolved against.
    pub root: PathBuf,
    pub client: HttpClient,
    pub locator: FirmwareLocator,
    pub rules: SourceRules,
    pub github_api_base: String,
}

impl FetchContext {
    pub fn new(root: PathBuf) -> Self {
        FetchContext {
            root,
            client: HttpClient::new(),
            locator: FirmwareLocator::default(),
            rules: SourceRules::default(),
            github_api_base: github::GITHUB_API_BASE.to_string(),
        }
    }
}

/// Process every manifest artifact that passes the filter set.
///
/// Filters match case-insensitively against artifact name or type; an empty
/// filter set processes everything. Returns the number of artifacts
/// processed. Filters that match nothing are a warning, not an error.
pub fn run(
    ctx: &FetchContext,
    manifest: &Manifest,
    filters: &[String],
) -> Result<usize, FetchError> {
    let filters: Vec<String> = filters.iter().map(|f| f.to_lowercase()).collect();
    let mut processed = 0;

    for artifact in &manifest.artifacts {
        if !selected(artifact, &filters) {
            output::detail(&format!("skipping {} (filtered out)", artifact.name));
            continue;
        }
        output::action(&format!("Processing artifact: {}", artifact.name));

        strategy::resolve(ctx, artifact)?;

        // Every resolution path must have left a file behind, whether it
        // came from a download or a host copy.
        let dest = ctx.root.join(&artifact.destination);
        if !dest.exists() {
            return Err(FetchError::Resolution {
                artifact: artifact.name.clone(),
                reason: format!("no file at destination {}", dest.display()),
            });
        }

        digest::verify_and_record(&dest, &artifact.sha256)?;
        processed += 1;
    }

    if !filters.is_empty() && processed == 0 {
        let mut sorted = filters.clone();
        sorted.sort();
        output::warning(&format!(
            "no artifacts matched filters: {}",
            sorted.join(", ")
        ));
    } else {
        output::success("all assets fetched successfully");
    }

    Ok(processed)
}

fn selected(artifact: &Artifact, filters: &[String]) -> bool {
    if filters.is_empty() {
        return true;
    }
    let name = artifact.name.to_lowercase();
    let kind = artifact.source.kind();
    filters.iter().any(|f| f == &name || f == kind)
}
