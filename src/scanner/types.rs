//! Scanner Types
//!
//! Shared value types used throughout the scanner module.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A single marker comment found in a scanned tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerRecord {
    pub text: String,
    pub tag: String,
    pub author: Option<String>,
    /// 1-based line number within the file
    pub line_number: usize,
    /// Path relative to the tree root, `/`-separated
    pub file_path: String,
    pub view_url: String,
}

/// All markers found in one scan of a location, in file-traversal order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub items: Vec<MarkerRecord>,
}

impl ScanResult {
    pub fn new(items: Vec<MarkerRecord>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Cached scan for a location, keyed by the version tag it was built from
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub version_tag: String,
    pub result: Arc<ScanResult>,
}

/// What a fetcher knows about a file before its content is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileInfo {
    pub size: u64,
}

/// File content handed to a comment parser
#[derive(Debug, Clone, Copy)]
pub struct SourceFile<'a> {
    pub path: &'a str,
    pub content: &'a [u8],
}

/// Marker as produced by a parser, before it is tied to a location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMarker {
    pub text: String,
    pub tag: String,
    pub author: Option<String>,
    pub line_number: usize,
}
