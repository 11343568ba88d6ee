//! Todo Scanner
//!
//! Central coordination component: serves the latest marker set for a
//! location, reuses the cached scan when upstream reports no change, and makes
//! concurrent callers for the same location share one in-flight scan.

use crate::scanner::cache::{ScanCache, DEFAULT_CACHE_CAPACITY};
use crate::scanner::coalesce::{InFlightScans, JoinKind};
use crate::scanner::error::{ScanError, ScanOutcome};
use crate::scanner::fetcher::{
    fetcher_for, ContentFetcher, FetcherKind, ReadTreeOptions, TreeSnapshot,
};
use crate::scanner::filter::FilePolicy;
use crate::scanner::parser::{CommentParser, TagCommentParser};
use crate::scanner::types::{CacheEntry, FileInfo, MarkerRecord, ScanResult, SourceFile};
use crate::scanner::url::{TemplateUrlResolver, ViewUrlResolver};
use std::sync::Arc;

/// Scanner for marker comments across file trees
#[derive(Clone)]
pub struct TodoScanner {
    worker: Arc<ScanWorker>,
    in_flight: InFlightScans,
}

/// Everything a spawned scan needs, shared across scans
struct ScanWorker {
    fetcher: Arc<dyn ContentFetcher>,
    parser: Arc<dyn CommentParser>,
    resolver: Arc<dyn ViewUrlResolver>,
    policy: FilePolicy,
    cache: ScanCache,
}

impl TodoScanner {
    pub fn builder() -> TodoScannerBuilder {
        TodoScannerBuilder::new()
    }

    /// Return the markers for `location`.
    ///
    /// Joins the running scan for the location if there is one. Otherwise
    /// fetches the tree conditionally on the cached version tag, and either
    /// reuses the cached result (not modified) or parses the new snapshot and
    /// replaces the cache entry. Errors are shared by every joined caller and
    /// leave the cache untouched.
    pub async fn request_scan(&self, location: &str) -> ScanOutcome<Arc<ScanResult>> {
        let worker = Arc::clone(&self.worker);
        let owned_location = location.to_string();

        let (scan, kind) = self.in_flight.join_or_start(location, move || async move {
            worker.scan(&owned_location).await
        })?;

        if kind == JoinKind::Joined {
            log::debug!("Joining in-flight scan of '{}'", location);
        }
        scan.await
    }

    /// Cached entry for a location, without scanning
    pub fn cached(&self, location: &str) -> Option<CacheEntry> {
        self.worker.cache.get(location)
    }

    /// Forget the cached scan so the next request fetches unconditionally
    pub fn invalidate(&self, location: &str) {
        self.worker.cache.invalidate(location);
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn cache_entry_count(&self) -> u64 {
        self.worker.cache.entry_count()
    }

    pub fn policy(&self) -> &FilePolicy {
        &self.worker.policy
    }
}

impl std::fmt::Debug for TodoScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoScanner")
            .field("policy", &self.worker.policy)
            .field("cache", &self.worker.cache)
            .field("in_flight", &self.in_flight)
            .finish()
    }
}

impl ScanWorker {
    async fn scan(&self, location: &str) -> ScanOutcome<Arc<ScanResult>> {
        let cached = self.cache.get(location);
        let policy = self.policy.clone();
        let options = ReadTreeOptions {
            version_tag: cached.as_ref().map(|entry| entry.version_tag.clone()),
            filter: Some(Arc::new(move |path: &str, info: &FileInfo| {
                policy.accepts(path, info)
            })),
        };

        match self.fetcher.read_tree(location, options).await {
            Ok(snapshot) => {
                let result = Arc::new(self.collect(location, &snapshot).await?);
                log::info!(
                    "Scanned '{}': {} markers at {}",
                    location,
                    result.len(),
                    snapshot.version_tag
                );
                self.cache.insert(
                    location,
                    CacheEntry {
                        version_tag: snapshot.version_tag,
                        result: Arc::clone(&result),
                    },
                );
                Ok(result)
            }
            Err(ScanError::NotModified { location: reported }) => match cached {
                Some(entry) => {
                    log::debug!(
                        "'{}' not modified since {}, using cached scan",
                        location,
                        entry.version_tag
                    );
                    Ok(entry.result)
                }
                None => {
                    log::warn!(
                        "'{}' reported not modified but no cached scan exists",
                        location
                    );
                    Err(ScanError::NotModified { location: reported })
                }
            },
            Err(e) => {
                log::warn!("Scan of '{}' failed: {}", location, e);
                Err(e)
            }
        }
    }

    /// Read and parse every accepted file of a snapshot, in snapshot order
    async fn collect(&self, location: &str, snapshot: &TreeSnapshot) -> ScanOutcome<ScanResult> {
        let mut items = Vec::new();

        for file in snapshot.files() {
            let path = file.path();
            if !self.policy.accepts(path, &file.info()) {
                log::trace!("Skipping '{}' by policy", path);
                continue;
            }

            let content = file.content().await?;
            let markers = match self.parser.parse(&SourceFile {
                path,
                content: &content,
            }) {
                Ok(markers) => markers,
                Err(e) => {
                    let error = ScanError::Parse {
                        path: path.to_string(),
                        message: e.to_string(),
                    };
                    log::warn!("{}; skipping file", error);
                    continue;
                }
            };

            items.extend(markers.into_iter().map(|marker| MarkerRecord {
                view_url: self.resolver.resolve(location, path, marker.line_number),
                text: marker.text,
                tag: marker.tag,
                author: marker.author,
                line_number: marker.line_number,
                file_path: path.to_string(),
            }));
        }

        Ok(ScanResult::new(items))
    }
}

/// Builder for [`TodoScanner`]; every collaborator has a default
pub struct TodoScannerBuilder {
    fetcher: Option<Arc<dyn ContentFetcher>>,
    parser: Option<Arc<dyn CommentParser>>,
    resolver: Option<Arc<dyn ViewUrlResolver>>,
    policy: FilePolicy,
    cache_capacity: u64,
}

impl TodoScannerBuilder {
    pub fn new() -> Self {
        Self {
            fetcher: None,
            parser: None,
            resolver: None,
            policy: FilePolicy::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn ContentFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn with_fetcher_kind(self, kind: FetcherKind) -> Self {
        self.with_fetcher(fetcher_for(kind))
    }

    pub fn with_parser(mut self, parser: Arc<dyn CommentParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn ViewUrlResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn with_policy(mut self, policy: FilePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: u64) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn build(self) -> TodoScanner {
        TodoScanner {
            worker: Arc::new(ScanWorker {
                fetcher: self.fetcher.unwrap_or_else(|| fetcher_for(FetcherKind::Auto)),
                parser: self
                    .parser
                    .unwrap_or_else(|| Arc::new(TagCommentParser::default())),
                resolver: self
                    .resolver
                    .unwrap_or_else(|| Arc::new(TemplateUrlResolver::default())),
                policy: self.policy,
                cache: ScanCache::new(self.cache_capacity),
            }),
            in_flight: InFlightScans::new(),
        }
    }
}

impl Default for TodoScannerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
