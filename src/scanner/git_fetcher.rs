//! Git Fetcher
//!
//! Reads the tree of a repository's HEAD commit. The version tag is the HEAD
//! commit id, so the snapshot only changes when a new commit is checked out.
//! Uncommitted work-tree changes are not visible to this fetcher.
//!
//! The filter sees each blob's size from its object header. Blob content is
//! only read when the scanner asks for it, so rejected blobs are never loaded.

use crate::scanner::error::{ScanError, ScanOutcome};
use crate::scanner::fetcher::{ContentFetcher, ReadTreeOptions, TreeFile, TreeSnapshot};
use crate::scanner::fs_fetcher::FilesystemFetcher;
use crate::scanner::types::FileInfo;
use async_trait::async_trait;
use std::path::PathBuf;

/// Fetcher for local git repositories
#[derive(Debug, Clone, Default)]
pub struct GitFetcher;

impl GitFetcher {
    pub fn new() -> Self {
        Self
    }
}

fn open_repository(location: &str, root: &std::path::Path) -> ScanOutcome<gix::Repository> {
    gix::open(root).map_err(|e| {
        ScanError::fetch(
            location,
            format!("Failed to open repository '{}': {}", root.display(), e),
        )
    })
}

#[async_trait]
impl ContentFetcher for GitFetcher {
    async fn read_tree(
        &self,
        location: &str,
        options: ReadTreeOptions,
    ) -> ScanOutcome<TreeSnapshot> {
        let root = PathBuf::from(FilesystemFetcher::location_root(location));
        let location = location.to_string();

        // gix operations block, so run them off the async workers
        tokio::task::spawn_blocking(move || {
            let repo = open_repository(&location, &root)?;
            let commit = repo.head_commit().map_err(|e| {
                ScanError::fetch(&location, format!("Failed to resolve HEAD: {}", e))
            })?;

            let tag = commit.id.to_string();
            if options.is_unchanged(&tag) {
                log::debug!("'{}' unchanged at {}", location, tag);
                return Err(ScanError::not_modified(&location));
            }

            let tree = commit.tree().map_err(|e| {
                ScanError::fetch(&location, format!("Failed to read HEAD tree: {}", e))
            })?;
            let mut recorder = gix::traverse::tree::Recorder::default();
            tree.traverse().breadthfirst(&mut recorder).map_err(|e| {
                ScanError::fetch(&location, format!("Failed to traverse tree: {}", e))
            })?;

            let mut entries: Vec<_> = recorder
                .records
                .into_iter()
                .filter(|entry| entry.mode.is_blob())
                .collect();
            entries.sort_by(|a, b| a.filepath.cmp(&b.filepath));

            let shared = repo.clone().into_sync();
            let mut files: Vec<Box<dyn TreeFile>> = Vec::new();
            for entry in entries {
                let path = entry.filepath.to_string();
                let header = repo.find_header(entry.oid).map_err(|e| {
                    ScanError::fetch(&location, format!("Failed to read blob '{}': {}", path, e))
                })?;
                let info = FileInfo {
                    size: header.size(),
                };

                if options.accepts(&path, &info) {
                    files.push(Box::new(GitFile {
                        location: location.clone(),
                        path,
                        info,
                        oid: entry.oid,
                        repo: shared.clone(),
                    }));
                } else {
                    log::trace!("Skipping blob '{}' ({} bytes)", path, info.size);
                }
            }

            log::debug!("'{}' listed {} files at {}", location, files.len(), tag);
            Ok(TreeSnapshot::new(tag, files))
        })
        .await
        .map_err(|e| ScanError::Internal {
            message: format!("Failed to execute git operation: {}", e),
        })?
    }
}

/// Blob at HEAD, read from the object database on demand
struct GitFile {
    location: String,
    path: String,
    info: FileInfo,
    oid: gix::ObjectId,
    repo: gix::ThreadSafeRepository,
}

#[async_trait]
impl TreeFile for GitFile {
    fn path(&self) -> &str {
        &self.path
    }

    fn info(&self) -> FileInfo {
        self.info
    }

    async fn content(&self) -> ScanOutcome<Vec<u8>> {
        let repo = self.repo.clone();
        let oid = self.oid;
        let read = tokio::task::spawn_blocking(move || {
            repo.to_thread_local()
                .find_object(oid)
                .map(|object| object.detach().data)
                .map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| ScanError::Internal {
            message: format!("Failed to execute git operation: {}", e),
        })?;

        read.map_err(|e| {
            ScanError::fetch(
                &self.location,
                format!("Failed to read blob '{}': {}", self.path, e),
            )
        })
    }
}
