//! Scanner Component
//!
//! Scans file trees for marker comments (`TODO`, `FIXME`, ...) and caches the
//! result per location.
//!
//! ## Core Features
//!
//! - **TodoScanner**: `request_scan(location)` with per-location request coalescing
//! - **Conditional Fetching**: cached scans are reused while the upstream version tag is unchanged
//! - **Bounded Cache**: least-recently-used eviction of scanned locations
//! - **Pluggable Collaborators**: fetchers, comment parsers and view URL resolvers are traits
//! - **File Policy**: hidden paths, binary/lock extensions, oversized files and excluded globs are skipped
//! - **Queries**: filtering, ordering and pagination over scan results

pub mod api;
pub mod cache;
pub mod coalesce;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod fs_fetcher;
pub mod git_fetcher;
pub mod manager;
pub mod parser;
pub mod query;
pub mod types;
pub mod url;

pub use error::{ScanError, ScanOutcome};
pub use manager::{TodoScanner, TodoScannerBuilder};
pub use types::{CacheEntry, MarkerRecord, ScanResult};

#[cfg(test)]
mod tests;
