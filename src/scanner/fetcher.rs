//! Content Fetcher
//!
//! A fetcher turns a location into a snapshot of its file tree. Fetchers
//! support conditional reads: when the caller supplies the version tag of a
//! previous snapshot and nothing changed, they answer with
//! [`ScanError::NotModified`] instead of a snapshot.

use crate::scanner::error::{ScanError, ScanOutcome};
use crate::scanner::filter::PathPredicate;
use crate::scanner::fs_fetcher::FilesystemFetcher;
use crate::scanner::git_fetcher::GitFetcher;
use crate::scanner::types::FileInfo;
use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Options for a single tree read
#[derive(Clone, Default)]
pub struct ReadTreeOptions {
    /// Tag of the snapshot the caller already holds
    pub version_tag: Option<String>,
    /// Files for which this returns false may be left out of the snapshot
    pub filter: Option<PathPredicate>,
}

impl ReadTreeOptions {
    /// Apply the filter, accepting everything when none is set
    pub fn accepts(&self, path: &str, info: &FileInfo) -> bool {
        self.filter.as_ref().map_or(true, |f| f(path, info))
    }

    /// True when `current_tag` matches the tag the caller supplied
    pub fn is_unchanged(&self, current_tag: &str) -> bool {
        self.version_tag.as_deref() == Some(current_tag)
    }
}

impl fmt::Debug for ReadTreeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadTreeOptions")
            .field("version_tag", &self.version_tag)
            .field("filter", &self.filter.is_some())
            .finish()
    }
}

/// A file in a fetched tree whose content is read on demand
#[async_trait]
pub trait TreeFile: Send + Sync {
    /// Path relative to the tree root, `/`-separated
    fn path(&self) -> &str;

    fn info(&self) -> FileInfo;

    async fn content(&self) -> ScanOutcome<Vec<u8>>;
}

/// Snapshot of a tree at one version
pub struct TreeSnapshot {
    pub version_tag: String,
    files: Vec<Box<dyn TreeFile>>,
}

impl TreeSnapshot {
    pub fn new(version_tag: impl Into<String>, files: Vec<Box<dyn TreeFile>>) -> Self {
        Self {
            version_tag: version_tag.into(),
            files,
        }
    }

    /// Files in traversal order
    pub fn files(&self) -> &[Box<dyn TreeFile>] {
        &self.files
    }
}

impl fmt::Debug for TreeSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeSnapshot")
            .field("version_tag", &self.version_tag)
            .field("files", &self.files.len())
            .finish()
    }
}

/// Reads file trees for locations
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn read_tree(&self, location: &str, options: ReadTreeOptions)
        -> ScanOutcome<TreeSnapshot>;
}

/// File whose content is already held in memory
#[derive(Debug, Clone)]
pub struct InMemoryFile {
    path: String,
    data: Arc<Vec<u8>>,
}

impl InMemoryFile {
    pub fn new(path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            data: Arc::new(data.into()),
        }
    }
}

#[async_trait]
impl TreeFile for InMemoryFile {
    fn path(&self) -> &str {
        &self.path
    }

    fn info(&self) -> FileInfo {
        FileInfo {
            size: self.data.len() as u64,
        }
    }

    async fn content(&self) -> ScanOutcome<Vec<u8>> {
        Ok(self.data.as_ref().clone())
    }
}

/// Which fetcher handles a location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetcherKind {
    /// Git when the location holds a `.git` entry, filesystem otherwise
    #[default]
    Auto,
    Filesystem,
    Git,
}

impl std::str::FromStr for FetcherKind {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(FetcherKind::Auto),
            "fs" | "filesystem" => Ok(FetcherKind::Filesystem),
            "git" => Ok(FetcherKind::Git),
            other => Err(ScanError::Configuration {
                message: format!(
                    "Unknown fetcher '{}' (expected one of: auto, fs, git)",
                    other
                ),
            }),
        }
    }
}

/// Build the fetcher for a kind
pub fn fetcher_for(kind: FetcherKind) -> Arc<dyn ContentFetcher> {
    match kind {
        FetcherKind::Auto => Arc::new(AutoFetcher::default()),
        FetcherKind::Filesystem => Arc::new(FilesystemFetcher::new()),
        FetcherKind::Git => Arc::new(GitFetcher::new()),
    }
}

/// Routes each location to the git or filesystem fetcher
#[derive(Debug, Default)]
pub struct AutoFetcher {
    filesystem: FilesystemFetcher,
    git: GitFetcher,
}

impl AutoFetcher {
    /// True if the location looks like a git work tree
    pub async fn is_git_location(location: &str) -> bool {
        let root = FilesystemFetcher::location_root(location);
        tokio::fs::metadata(Path::new(&root).join(".git"))
            .await
            .is_ok()
    }
}

#[async_trait]
impl ContentFetcher for AutoFetcher {
    async fn read_tree(
        &self,
        location: &str,
        options: ReadTreeOptions,
    ) -> ScanOutcome<TreeSnapshot> {
        if Self::is_git_location(location).await {
            log::debug!("Reading '{}' as a git repository", location);
            self.git.read_tree(location, options).await
        } else {
            log::debug!("Reading '{}' as a directory tree", location);
            self.filesystem.read_tree(location, options).await
        }
    }
}
