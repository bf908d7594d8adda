//! Cache module for downloaded data files
//!
//! This module tracks when each downloaded file was last written. Every payload
//! gets a JSON sidecar record next to it holding the fetch timestamp, which the
//! fetcher compares against a freshness window before deciding to download again.

mod manager;

pub use manager::{CacheManager, FetchRecord, Staleness};
