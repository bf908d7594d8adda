//! Cache manager for downloaded payloads and their fetch records
//!
//! Provides a `CacheManager` that owns the data directory, maps file names to
//! paths inside it and reads/writes the `<payload>.meta.json` sidecar records.

use chrono::{DateTime, Duration, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix appended to a payload path to get its record path
const RECORD_SUFFIX: &str = ".meta.json";

/// Directory used when no XDG cache directory can be determined
const FALLBACK_DATA_DIR: &str = "data";

/// Record stored beside a cached payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchRecord {
    /// URL the payload was downloaded from
    pub source_url: String,
    /// When the payload was last written
    pub fetched_at: DateTime<Utc>,
}

/// Why a cached payload is (or is not) usable without downloading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    /// Record is younger than the freshness window and the payload exists
    Fresh,
    /// No record (or an unreadable one) exists for the payload
    NeverFetched,
    /// Record was written for a different URL
    SourceChanged,
    /// Record is older than the freshness window
    Expired,
    /// Record looks fresh but the payload file is gone
    PayloadMissing,
}

impl Staleness {
    /// Returns true when no download is needed
    pub fn is_fresh(self) -> bool {
        self == Staleness::Fresh
    }
}

/// Manages the data directory and fetch records
///
/// Payloads live in an XDG-compliant cache directory (`~/.cache/covidplot/` on
/// Linux) unless a directory is given explicitly. Records are plain JSON so they
/// can be inspected or deleted by hand.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Directory where payloads and records are stored
    data_dir: PathBuf,
}

impl Default for CacheManager {
    fn default() -> Self {
        Self::new().unwrap_or_else(|| Self::with_dir(PathBuf::from(FALLBACK_DATA_DIR)))
    }
}

impl CacheManager {
    /// Creates a new CacheManager using the XDG cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "covidplot")?;
        let data_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { data_dir })
    }

    /// Creates a new CacheManager with a custom data directory
    pub fn with_dir(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Returns the data directory
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Returns the path of a payload file inside the data directory
    pub fn file_path(&self, file_name: &str) -> PathBuf {
        self.data_dir.join(file_name)
    }

    /// Returns the sidecar record path for a payload path
    pub fn record_path(payload: &Path) -> PathBuf {
        let mut name = payload.as_os_str().to_os_string();
        name.push(RECORD_SUFFIX);
        PathBuf::from(name)
    }

    /// Reads the fetch record for a payload
    ///
    /// Returns `None` if the record doesn't exist or cannot be parsed; callers
    /// treat both as "never fetched".
    pub fn read_record(&self, payload: &Path) -> Option<FetchRecord> {
        let content = fs::read_to_string(Self::record_path(payload)).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Writes the fetch record for a payload, replacing any previous one
    pub fn write_record(&self, payload: &Path, record: &FetchRecord) -> std::io::Result<()> {
        if let Some(parent) = payload.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(record)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        fs::write(Self::record_path(payload), json)
    }

    /// Classifies a payload downloaded from `source_url` at time `now`
    ///
    /// A payload is fresh only when its record names the same URL, is strictly
    /// younger than `window`, and the payload file still exists.
    pub fn staleness(
        &self,
        payload: &Path,
        source_url: &str,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Staleness {
        let Some(record) = self.read_record(payload) else {
            return Staleness::NeverFetched;
        };

        if record.source_url != source_url {
            return Staleness::SourceChanged;
        }

        if now - record.fetched_at >= window {
            return Staleness::Expired;
        }

        if !payload.is_file() {
            return Staleness::PayloadMissing;
        }

        Staleness::Fresh
    }
}
