//! GitHub release asset lookup
//!
//! Thin collaborator around the releases API: given repo, tag, and asset
//! name, produce the asset's direct download URL. Authentication is optional;
//! a `GITHUB_TOKEN` in the environment raises the effective rate limits.

use crate::output;

use super::error::FetchError;
use super::http::HttpClient;

/// Default GitHub API base URL
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Resolve the download URL of a named release asset.
///
/// Reads `GITHUB_TOKEN` from the environment for authenticated requests.
pub fn release_asset_url(
    client: &HttpClient,
    api_base: &str,
    repo: &str,
    tag: &str,
    asset: &str,
) -> Result<String, FetchError> {
    let token = std::env::var("GITHUB_TOKEN").ok();
    release_asset_url_with_token(client, api_base, repo, tag, asset, token.as_deref())
}

fn release_asset_url_with_token(
    client: &HttpClient,
    api_base: &str,
    repo: &str,
    tag: &str,
    asset: &str,
    token: Option<&str>,
) -> Result<String, FetchError> {
    let url = format!("{}/repos/{}/releases/tags/{}", api_base, repo, tag);
    output::detail(&format!("querying GitHub release {}@{}", repo, tag));

    let mut headers = vec![("Accept", "application/vnd.github+json")];
    let auth;
    if let Some(token) = token {
        auth = format!("Bearer {}", token);
        headers.push(("Authorization", auth.as_str()));
    }

    let json = client.get_json(&url, &headers)?;
    let assets = json
        .get("assets")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();

    for entry in &assets {
        if entry.get("name").and_then(|v| v.as_str()) == Some(asset) {
            if let Some(download_url) = entry.get("browser_download_url").and_then(|v| v.as_str()) {
                return Ok(download_url.to_string());
            }
        }
    }

    Err(FetchError::Resolution {
        artifact: asset.to_string(),
        reason: format!("asset not found in release {}@{}", repo, tag),
    })
}
