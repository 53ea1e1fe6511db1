//! Per-type source resolution and upstream URL quirks
//!
//! Maps an artifact's declared type to the logic that produces its file.
//! The kernel.org git-web quirks (blobs that moved between directory
//! layouts, the 403-without-ref-hint behavior) live in [`SourceRules`] as
//! plain data, so a newly special-cased artifact is a table entry rather
//! than a code branch, and the quirks can be overridden when the upstream
//! layout drifts.

use crate::manifest::{Artifact, Source};
use crate::output;

use super::candidates::try_candidates;
use super::driver::FetchContext;
use super::error::FetchError;
use super::github;

/// Upstream linux-firmware git-web plain-blob base.
const LINUX_FIRMWARE_PLAIN: &str =
    "https://git.kernel.org/pub/scm/linux/kernel/git/firmware/linux-firmware.git/plain";

/// An artifact with its own ordered fallback tiers: upstream URL candidates
/// first, then host/package glob patterns.
#[derive(Debug, Clone)]
pub struct SpecialSource {
    pub artifact: String,
    pub candidates: Vec<String>,
    pub host_patterns: Vec<String>,
}

/// Vendor blobs whose filenames carry `file_prefix` moved from
/// `<vendor_dir>/` into `<vendor_dir>/<nested_dir>/` upstream; when a
/// declared URL still uses the flat layout, the nested path is tried first.
#[derive(Debug, Clone)]
pub struct NestedDirRule {
    pub file_prefix: String,
    pub vendor_dir: String,
    pub nested_dir: String,
}

impl NestedDirRule {
    /// Candidate list for a declared URL, nested path first, or `None` when
    /// the rule does not apply.
    pub fn candidates(&self, url: &str) -> Option<Vec<String>> {
        let nested_fragment = format!("/{}/{}/", self.vendor_dir, self.nested_dir);
        if url.contains(&nested_fragment) {
            return None;
        }
        let (base, filename) = url.rsplit_once('/')?;
        if filename.starts_with(&self.file_prefix)
            && base.ends_with(&format!("/{}", self.vendor_dir))
        {
            return Some(vec![
                format!("{}/{}/{}", base, self.nested_dir, filename),
                url.to_string(),
            ]);
        }
        None
    }
}

/// Site-specific source rules for `kernel_firmware` artifacts.
#[derive(Debug, Clone)]
pub struct SourceRules {
    pub specials: Vec<SpecialSource>,
    pub nested_dir: Option<NestedDirRule>,
    /// Appended once on an HTTP 403 for query-less URLs; the upstream git-web
    /// rejects some plain blob paths unless an explicit ref hint is given.
    pub forbidden_retry_suffix: Option<String>,
}

impl Default for SourceRules {
    fn default() -> Self {
        SourceRules {
            specials: vec![SpecialSource {
                artifact: "mt7996_dsp".to_string(),
                candidates: vec![
                    format!("{}/mediatek/mt7996/mt7996_dsp.bin", LINUX_FIRMWARE_PLAIN),
                    format!("{}/mediatek/mt7996_dsp.bin", LINUX_FIRMWARE_PLAIN),
                ],
                host_patterns: vec![
                    "mediatek/mt7996/mt7996_dsp.bin".to_string(),
                    "mediatek/mt7996_dsp.bin".to_string(),
                ],
            }],
            nested_dir: Some(NestedDirRule {
                file_prefix: "mt7996_".to_string(),
                vendor_dir: "mediatek".to_string(),
                nested_dir: "mt7996".to_string(),
            }),
            forbidden_retry_suffix: Some("?h=HEAD".to_string()),
        }
    }
}

impl SourceRules {
    fn special_for(&self, name: &str) -> Option<&SpecialSource> {
        self.specials.iter().find(|s| s.artifact == name)
    }
}

/// Resolve one artifact: populate its destination file or fail.
pub fn resolve(ctx: &FetchContext, artifact: &Artifact) -> Result<(), FetchError> {
    match &artifact.source {
        Source::Github { repo, tag, asset } => {
            let url =
                github::release_asset_url(&ctx.client, &ctx.github_api_base, repo, tag, asset)?;
            ctx.client.fetch(&url, &ctx.root.join(&artifact.destination))
        }
        Source::KernelFirmware { url } => kernel_firmware(ctx, artifact, url),
    }
}

/// Tiered resolution for firmware blobs: the per-artifact candidate table,
/// the nested-directory heuristic, then the declared URL with the 403 retry.
fn kernel_firmware(ctx: &FetchContext, artifact: &Artifact, url: &str) -> Result<(), FetchError> {
    let dest = ctx.root.join(&artifact.destination);
    let expected = Some(artifact.sha256.as_str());

    if let Some(special) = ctx.rules.special_for(&artifact.name) {
        if try_candidates(&ctx.client, &special.candidates, &dest, expected) {
            return Ok(());
        }
        if ctx.locator.locate(&special.host_patterns, &dest, expected)? {
            return Ok(());
        }
        return Err(FetchError::Resolution {
            artifact: artifact.name.clone(),
            reason: "no upstream candidate or host/package fallback produced the file".to_string(),
        });
    }

    if let Some(rule) = &ctx.rules.nested_dir
        && let Some(nested) = rule.candidates(url)
        && try_candidates(&ctx.client, &nested, &dest, expected)
    {
        return Ok(());
    }

    match ctx.client.fetch(url, &dest) {
        Ok(()) => Ok(()),
        Err(err) if err.is_forbidden() && !url.contains('?') => {
            let Some(suffix) = &ctx.rules.forbidden_retry_suffix else {
                return Err(err);
            };
            output::warning(&format!(
                "retrying firmware download with {}: {}",
                suffix, url
            ));
            ctx.client.fetch(&format!("{}{}", url, suffix), &dest)
        }
        Err(err) => Err(err),
    }
}
