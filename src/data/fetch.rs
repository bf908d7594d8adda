//! Staleness-gated downloader
//!
//! Downloads a remote file into the data directory only when the local copy is
//! missing or older than the freshness window, and records the fetch time in a
//! sidecar record afterwards.

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use crate::cache::{CacheManager, FetchRecord};

/// Default freshness window: 0.1 days
pub const DEFAULT_STALE_AFTER_MINUTES: i64 = 144;

/// Errors that can occur while refreshing a cached file
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Download of {url} failed with status {status}")]
    BadStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Writing the payload or its record failed
    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// What `ensure_fresh` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Cached copy was fresh, nothing was downloaded
    Fresh,
    /// A new copy was downloaded and written
    Downloaded { bytes: usize },
}

/// Downloads files into a `CacheManager`'s data directory when they go stale
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    cache: CacheManager,
    stale_after: Duration,
}

impl Fetcher {
    /// Creates a new Fetcher with the default freshness window
    pub fn new(cache: CacheManager) -> Self {
        Self {
            client: Client::new(),
            cache,
            stale_after: Duration::minutes(DEFAULT_STALE_AFTER_MINUTES),
        }
    }

    /// Create a new Fetcher with a custom HTTP client
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Sets the freshness window
    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    /// Returns the cache manager backing this fetcher
    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// Returns the freshness window
    pub fn stale_after(&self) -> Duration {
        self.stale_after
    }

    /// Makes sure `destination` holds a copy of `url` younger than the freshness window
    ///
    /// # Returns
    /// * `Ok(FetchOutcome::Fresh)` - cached copy reused, no request made
    /// * `Ok(FetchOutcome::Downloaded)` - file redownloaded and record updated
    /// * `Err(FetchError)` - request or write failed; the record is left untouched
    pub async fn ensure_fresh(
        &self,
        url: &str,
        destination: &Path,
    ) -> Result<FetchOutcome, FetchError> {
        self.ensure_fresh_at(url, destination, Utc::now()).await
    }

    /// Same as `ensure_fresh`, with the current time supplied by the caller
    ///
    /// `now` is both the reference point for the staleness check and the
    /// timestamp recorded after a successful download.
    pub async fn ensure_fresh_at(
        &self,
        url: &str,
        destination: &Path,
        now: DateTime<Utc>,
    ) -> Result<FetchOutcome, FetchError> {
        let staleness = self.cache.staleness(destination, url, now, self.stale_after);
        if staleness.is_fresh() {
            info!(path = %destination.display(), "Data up to date, skipping download");
            return Ok(FetchOutcome::Fresh);
        }

        info!(url, reason = ?staleness, "Data stale or missing, downloading");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus {
                url: url.to_string(),
                status,
            });
        }
        let bytes = response.bytes().await?;

        write_payload(destination, &bytes)?;

        let record = FetchRecord {
            source_url: url.to_string(),
            fetched_at: now,
        };
        self.cache
            .write_record(destination, &record)
            .map_err(|source| FetchError::Io {
                path: CacheManager::record_path(destination).display().to_string(),
                source,
            })?;

        info!(path = %destination.display(), bytes = bytes.len(), "Data updated");
        Ok(FetchOutcome::Downloaded { bytes: bytes.len() })
    }
}

/// Writes the downloaded bytes verbatim, creating parent directories first
fn write_payload(destination: &Path, bytes: &[u8]) -> Result<(), FetchError> {
    let io_err = |source| FetchError::Io {
        path: destination.display().to_string(),
        source,
    };

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    debug!(path = %destination.display(), "Writing payload");
    fs::write(destination, bytes).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_stale_after_is_a_tenth_of_a_day() {
        let fetcher = Fetcher::new(CacheManager::with_dir("data".into()));
        assert_eq!(fetcher.stale_after(), Duration::hours(24) / 10);
    }

    #[test]
    fn test_with_stale_after_overrides_window() {
        let fetcher = Fetcher::new(CacheManager::with_dir("data".into()))
            .with_stale_after(Duration::hours(6));
        assert_eq!(fetcher.stale_after(), Duration::hours(6));
    }

    #[test]
    fn test_write_payload_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("a").join("b").join("cases.csv");

        write_payload(&destination, b"x,y\n1,2\n").expect("Write should succeed");

        assert_eq!(fs::read(&destination).unwrap(), b"x,y\n1,2\n");
    }

    #[tokio::test]
    async fn test_fresh_record_skips_request_to_unroutable_url() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = Fetcher::new(CacheManager::with_dir(temp_dir.path().to_path_buf()));
        let destination = fetcher.cache().file_path("cases.csv");
        let now = Utc::now();
        fs::write(&destination, "cached").unwrap();
        fetcher
            .cache()
            .write_record(
                &destination,
                &FetchRecord {
                    source_url: "http://127.0.0.1:9/cases.csv".to_string(),
                    fetched_at: now,
                },
            )
            .unwrap();

        // Any request to port 9 would fail, so success proves no request was made
        let outcome = fetcher
            .ensure_fresh_at("http://127.0.0.1:9/cases.csv", &destination, now)
            .await
            .expect("Fresh data should not be downloaded");

        assert_eq!(outcome, FetchOutcome::Fresh);
        assert_eq!(fs::read_to_string(&destination).unwrap(), "cached");
    }
}
