//! Scanner API
//!
//! Everything a library user needs to build a [`TodoScanner`], plug in their
//! own fetcher, parser or URL resolver, and query the results.

// Core scanner
pub use crate::scanner::manager::{TodoScanner, TodoScannerBuilder};

// Error handling
pub use crate::scanner::error::{ScanError, ScanOutcome};

// Collaborators
pub use crate::scanner::fetcher::{
    fetcher_for, AutoFetcher, ContentFetcher, FetcherKind, InMemoryFile, ReadTreeOptions,
    TreeFile, TreeSnapshot,
};
pub use crate::scanner::filter::{FilePolicy, PathPredicate, DEFAULT_MAX_FILE_SIZE};
pub use crate::scanner::fs_fetcher::FilesystemFetcher;
pub use crate::scanner::git_fetcher::GitFetcher;
pub use crate::scanner::parser::{CommentParser, ParseError, TagCommentParser, DEFAULT_TAGS};
pub use crate::scanner::url::{TemplateUrlResolver, ViewUrlResolver, DEFAULT_VIEW_URL_TEMPLATE};

// Queries
pub use crate::scanner::query::{
    FieldFilter, ListPage, ListQuery, MarkerField, OrderBy, SortDirection,
};

// Core data types and structures
pub use crate::scanner::types::{
    CacheEntry, FileInfo, MarkerRecord, ParsedMarker, ScanResult, SourceFile,
};
