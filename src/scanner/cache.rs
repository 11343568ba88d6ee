//! Scan Cache
//!
//! Bounded store of the latest scan per location, keyed by the exact location
//! string. Entries are replaced wholesale after each fresh scan; once the
//! capacity is reached the least recently used locations are evicted.

use crate::scanner::types::CacheEntry;
use moka::sync::Cache;

/// Default number of locations kept
pub const DEFAULT_CACHE_CAPACITY: u64 = 1_000;

/// Location-keyed cache of completed scans
#[derive(Clone)]
pub struct ScanCache {
    inner: Cache<String, CacheEntry>,
}

impl ScanCache {
    /// Create a cache holding at most `capacity` locations
    pub fn new(capacity: u64) -> Self {
        Self {
            inner: Cache::new(capacity),
        }
    }

    pub fn get(&self, location: &str) -> Option<CacheEntry> {
        self.inner.get(location)
    }

    /// Replace the entry for `location`
    pub fn insert(&self, location: &str, entry: CacheEntry) {
        self.inner.insert(location.to_string(), entry);
    }

    pub fn invalidate(&self, location: &str) {
        self.inner.invalidate(location);
    }

    /// Approximate number of entries (eviction is applied lazily)
    pub fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }
}

impl Default for ScanCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl std::fmt::Debug for ScanCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanCache")
            .field("entry_count", &self.inner.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::types::ScanResult;
    use std::sync::Arc;

    fn entry(tag: &str) -> CacheEntry {
        CacheEntry {
            version_tag: tag.to_string(),
            result: Arc::new(ScanResult::default()),
        }
    }

    #[test]
    fn test_insert_replaces_entry() {
        let cache = ScanCache::default();
        cache.insert("repo-a", entry("v1"));
        cache.insert("repo-a", entry("v2"));

        assert_eq!(cache.get("repo-a").unwrap().version_tag, "v2");
        assert_eq!(cache.entry_count(), 1);
    }

    #[test]
    fn test_invalidate() {
        let cache = ScanCache::default();
        cache.insert("repo-a", entry("v1"));
        cache.invalidate("repo-a");
        assert!(cache.get("repo-a").is_none());
    }

    #[test]
    fn test_capacity_bound() {
        let cache = ScanCache::new(2);
        for i in 0..10 {
            cache.insert(&format!("repo-{}", i), entry("v1"));
        }
        assert!(cache.entry_count() <= 2);
    }
}
