//! Ordered candidate URL fallback
//!
//! Tries each URL in turn and accepts the first download that passes the
//! optional digest check. A failed transport or a rejected digest is not
//! fatal here; it just moves the search to the next candidate. The caller
//! decides whether exhausting the list is an error.

use std::path::Path;

use crate::output;

use super::digest;
use super::error::FetchError;
use super::http::HttpClient;

/// Outcome of trying a single candidate URL.
enum Attempt {
    Accepted,
    TransportFailed(FetchError),
    DigestRejected { actual: String },
}

/// Try each URL in order; true once one downloads and verifies.
///
/// A digest rejection deletes the downloaded file before moving on, so the
/// destination never retains data from a discarded candidate.
pub fn try_candidates(
    client: &HttpClient,
    urls: &[String],
    dest: &Path,
    expected: Option<&str>,
) -> bool {
    for url in urls {
        match try_one(client, url, dest, expected) {
            Attempt::Accepted => return true,
            Attempt::TransportFailed(err) => {
                output::warning(&format!("{}", err));
            }
            Attempt::DigestRejected { actual } => {
                output::warning(&format!(
                    "discarding {} due to sha256 mismatch (got {})",
                    url, actual
                ));
                std::fs::remove_file(dest).ok();
            }
        }
    }
    false
}

fn try_one(client: &HttpClient, url: &str, dest: &Path, expected: Option<&str>) -> Attempt {
    if let Err(err) = client.fetch(url, dest) {
        return Attempt::TransportFailed(err);
    }
    if let Some(expected) = expected {
        match digest::sha256_file(dest) {
            Ok(actual) if actual == expected.to_lowercase() => Attempt::Accepted,
            Ok(actual) => Attempt::DigestRejected { actual },
            Err(err) => Attempt::TransportFailed(err),
        }
    } else {
        Attempt::Accepted
    }
}
