//! HTTP transport with atomic publish semantics
//!
//! One `ureq` agent is built at startup and shared for every request so
//! connections are reused across candidates. Downloads stream into a
//! temporary file next to the destination and are renamed into place only
//! after the full body has been written; a partial download is never visible
//! at the destination path.

use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use crate::output;

use super::error::FetchError;
use super::fs_utils;

/// User-Agent sent on every request.
const USER_AGENT: &str = "fetch-assets/0.1";

/// Timeout for artifact downloads.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Timeout for API requests.
const API_TIMEOUT: Duration = Duration::from_secs(60);

/// Shared HTTP client for all artifact and API requests.
pub struct HttpClient {
    agent: ureq::Agent,
}

impl HttpClient {
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new().user_agent(USER_AGENT).build();
        HttpClient { agent }
    }

    /// Download `url` to `dest`, creating parent directories as needed.
    ///
    /// The body streams into a temp file colocated with `dest` (same
    /// filesystem, so the final rename is atomic); the temp file is promoted
    /// only on full success and removed on every failure path. A non-200
    /// status carries the numeric code so callers can react to specific
    /// statuses.
    pub fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        fs_utils::ensure_parent_dir(dest)?;
        output::detail(&format!("downloading {}", url));

        let response = self
            .agent
            .get(url)
            .timeout(DOWNLOAD_TIMEOUT)
            .call()
            .map_err(|e| status_error(url, e))?;

        let filename = dest
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "download".to_string());
        let pb = output::spinner(&format!("downloading {}", filename));
        if let Some(len) = response
            .header("content-length")
            .and_then(|s| s.parse().ok())
        {
            output::upgrade_to_bytes(&pb, len);
        }

        // Dropped (and auto-removed) unless the whole body is written.
        let parent = dest.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;

        let mut reader = response.into_reader();
        let mut buffer = [0u8; 8192];
        let mut total_bytes = 0u64;
        loop {
            let n = match reader.read(&mut buffer) {
                Ok(n) => n,
                Err(e) => {
                    pb.finish_and_clear();
                    return Err(FetchError::Network {
                        url: url.to_string(),
                        reason: format!("read error: {}", e),
                    });
                }
            };
            if n == 0 {
                break;
            }
            if let Err(e) = tmp.write_all(&buffer[..n]) {
                pb.finish_and_clear();
                return Err(FetchError::Io(e));
            }
            total_bytes += n as u64;
            pb.set_position(total_bytes);
        }
        pb.finish_and_clear();

        tmp.persist(dest).map_err(|e| FetchError::Io(e.error))?;
        Ok(())
    }

    /// GET a JSON document (used for the releases API).
    pub fn get_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<serde_json::Value, FetchError> {
        let mut request = self.agent.get(url).timeout(API_TIMEOUT);
        for (name, value) in headers {
            request = request.set(name, value);
        }
        let response = request.call().map_err(|e| status_error(url, e))?;
        response.into_json().map_err(|e| FetchError::Network {
            url: url.to_string(),
            reason: format!("invalid JSON response: {}", e),
        })
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

fn status_error(url: &str, err: ureq::Error) -> FetchError {
    match err {
        ureq::Error::Status(status, _) => FetchError::HttpStatus {
            url: url.to_string(),
            status,
        },
        ureq::Error::Transport(t) => FetchError::Network {
            url: url.to_string(),
            reason: t.to_string(),
        },
    }
}
