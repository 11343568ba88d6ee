//! Filesystem Fetcher
//!
//! Reads a local directory tree. The version tag is a SHA-256 digest over the
//! relative path, size and modification time of every accepted file, so any
//! added, removed, resized or touched file produces a new tag. Hidden
//! directories (`.git`, `.venv`, ...) are not descended into.

use crate::scanner::error::{ScanError, ScanOutcome};
use crate::scanner::fetcher::{ContentFetcher, ReadTreeOptions, TreeFile, TreeSnapshot};
use crate::scanner::types::FileInfo;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::UNIX_EPOCH;

/// Fetcher for local directories (`/path/to/dir` or `file:///path/to/dir`)
#[derive(Debug, Clone, Default)]
pub struct FilesystemFetcher;

/// File discovered while walking a directory
#[derive(Debug, Clone)]
struct WalkedFile {
    relative: String,
    absolute: PathBuf,
    size: u64,
    modified_nanos: u128,
}

impl FilesystemFetcher {
    pub fn new() -> Self {
        Self
    }

    /// Strip a `file://` scheme from a location
    pub fn location_root(location: &str) -> String {
        location
            .strip_prefix("file://")
            .unwrap_or(location)
            .to_string()
    }

    /// Walk `root` and return every regular file outside hidden directories,
    /// ordered by relative path. Symbolic links are not followed.
    async fn walk(location: &str, root: &Path) -> ScanOutcome<Vec<WalkedFile>> {
        let metadata = tokio::fs::metadata(root)
            .await
            .map_err(|e| ScanError::fetch(location, format!("Cannot access directory: {}", e)))?;
        if !metadata.is_dir() {
            return Err(ScanError::fetch(location, "Location is not a directory"));
        }

        let mut files = Vec::new();
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir).await.map_err(|e| {
                ScanError::fetch(
                    location,
                    format!("Failed to read directory '{}': {}", dir.display(), e),
                )
            })?;

            while let Some(entry) = entries.next_entry().await.map_err(|e| {
                ScanError::fetch(
                    location,
                    format!("Failed to read directory '{}': {}", dir.display(), e),
                )
            })? {
                let file_type = match entry.file_type().await {
                    Ok(file_type) => file_type,
                    Err(e) => {
                        log::debug!("Skipping '{}': {}", entry.path().display(), e);
                        continue;
                    }
                };

                let path = entry.path();
                if file_type.is_dir() {
                    if entry.file_name().to_string_lossy().starts_with('.') {
                        log::trace!("Not descending into '{}'", path.display());
                        continue;
                    }
                    pending.push(path);
                } else if file_type.is_file() {
                    let metadata = entry.metadata().await.map_err(|e| {
                        ScanError::fetch(
                            location,
                            format!("Failed to stat '{}': {}", path.display(), e),
                        )
                    })?;
                    let modified_nanos = metadata
                        .modified()
                        .ok()
                        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                        .map_or(0, |d| d.as_nanos());

                    files.push(WalkedFile {
                        relative: relative_path(root, &path),
                        absolute: path,
                        size: metadata.len(),
                        modified_nanos,
                    });
                }
            }
        }

        files.sort_by(|a, b| a.relative.cmp(&b.relative));
        Ok(files)
    }
}

fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn version_tag(files: &[WalkedFile]) -> String {
    let mut hasher = Sha256::new();
    for file in files {
        hasher.update(file.relative.as_bytes());
        hasher.update([0u8]);
        hasher.update(file.size.to_le_bytes());
        hasher.update(file.modified_nanos.to_le_bytes());
        hasher.update([b'\n']);
    }
    format!("{:x}", hasher.finalize())
}

#[async_trait]
impl ContentFetcher for FilesystemFetcher {
    async fn read_tree(
        &self,
        location: &str,
        options: ReadTreeOptions,
    ) -> ScanOutcome<TreeSnapshot> {
        let root = PathBuf::from(Self::location_root(location));
        let files: Vec<WalkedFile> = Self::walk(location, &root)
            .await?
            .into_iter()
            .filter(|f| options.accepts(&f.relative, &FileInfo { size: f.size }))
            .collect();

        let tag = version_tag(&files);
        if options.is_unchanged(&tag) {
            log::debug!("'{}' unchanged ({} files)", location, files.len());
            return Err(ScanError::not_modified(location));
        }

        log::debug!("'{}' read {} files at tag {}", location, files.len(), tag);
        let location: Arc<str> = Arc::from(location);
        let handles = files
            .into_iter()
            .map(|file| {
                Box::new(FsFile {
                    location: Arc::clone(&location),
                    file,
                }) as Box<dyn TreeFile>
            })
            .collect();
        Ok(TreeSnapshot::new(tag, handles))
    }
}

/// Lazily-read file on local disk
#[derive(Debug)]
struct FsFile {
    location: Arc<str>,
    file: WalkedFile,
}

#[async_trait]
impl TreeFile for FsFile {
    fn path(&self) -> &str {
        &self.file.relative
    }

    fn info(&self) -> FileInfo {
        FileInfo {
            size: self.file.size,
        }
    }

    async fn content(&self) -> ScanOutcome<Vec<u8>> {
        tokio::fs::read(&self.file.absolute).await.map_err(|e| {
            ScanError::fetch(
                &self.location,
                format!("Failed to read '{}': {}", self.file.relative, e),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[tokio::test]
    async fn test_reads_files_in_path_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.rs", "b");
        write(dir.path(), "a/z.rs", "z");
        write(dir.path(), "a/y.rs", "y");

        let location = dir.path().to_string_lossy().to_string();
        let snapshot = FilesystemFetcher::new()
            .read_tree(&location, ReadTreeOptions::default())
            .await
            .unwrap();

        let paths: Vec<&str> = snapshot.files().iter().map(|f| f.path()).collect();
        assert_eq!(paths, vec!["a/y.rs", "a/z.rs", "b.rs"]);
        assert_eq!(snapshot.files()[2].content().await.unwrap(), b"b".to_vec());
        assert_eq!(snapshot.files()[2].info(), FileInfo { size: 1 });
    }

    #[tokio::test]
    async fn test_not_modified_for_same_tag() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "main.rs", "// TODO");
        let location = format!("file://{}", dir.path().display());
        let fetcher = FilesystemFetcher::new();

        let first = fetcher
            .read_tree(&location, ReadTreeOptions::default())
            .await
            .unwrap();
        let second = fetcher
            .read_tree(
                &location,
                ReadTreeOptions {
                    version_tag: Some(first.version_tag.clone()),
                    filter: None,
                },
            )
            .await;

        assert_eq!(second.unwrap_err(), ScanError::not_modified(&location));
    }

    #[tokio::test]
    async fn test_tag_changes_when_file_added() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "main.rs", "fn main() {}");
        let location = dir.path().to_string_lossy().to_string();
        let fetcher = FilesystemFetcher::new();

        let first = fetcher
            .read_tree(&location, ReadTreeOptions::default())
            .await
            .unwrap();
        write(dir.path(), "lib.rs", "// FIXME");
        let second = fetcher
            .read_tree(
                &location,
                ReadTreeOptions {
                    version_tag: Some(first.version_tag.clone()),
                    filter: None,
                },
            )
            .await
            .unwrap();

        assert_ne!(first.version_tag, second.version_tag);
        assert_eq!(second.files().len(), 2);
    }

    #[tokio::test]
    async fn test_filter_applied() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "keep.rs", "x");
        write(dir.path(), "drop.md", "x");
        let location = dir.path().to_string_lossy().to_string();

        let snapshot = FilesystemFetcher::new()
            .read_tree(
                &location,
                ReadTreeOptions {
                    version_tag: None,
                    filter: Some(Arc::new(|path: &str, _: &FileInfo| path.ends_with(".rs"))),
                },
            )
            .await
            .unwrap();

        assert_eq!(snapshot.files().len(), 1);
        assert_eq!(snapshot.files()[0].path(), "keep.rs");
    }

    #[tokio::test]
    async fn test_hidden_directories_not_walked() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/main.rs", "// TODO");
        write(dir.path(), ".git/config", "[core]");
        write(dir.path(), ".venv/lib/site.py", "# TODO vendored");
        write(dir.path(), "src/.cache/blob.rs", "// TODO cached");
        let location = dir.path().to_string_lossy().to_string();

        let snapshot = FilesystemFetcher::new()
            .read_tree(&location, ReadTreeOptions::default())
            .await
            .unwrap();

        let paths: Vec<&str> = snapshot.files().iter().map(|f| f.path()).collect();
        assert_eq!(paths, vec!["src/main.rs"]);

        // Changes inside hidden directories do not change the tag
        write(dir.path(), ".git/HEAD", "ref: refs/heads/main");
        let again = FilesystemFetcher::new()
            .read_tree(
                &location,
                ReadTreeOptions {
                    version_tag: Some(snapshot.version_tag.clone()),
                    filter: None,
                },
            )
            .await;
        assert!(again.unwrap_err().is_not_modified());
    }

    #[tokio::test]
    async fn test_read_failure_names_location_and_path() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/a.rs", "// TODO");
        let location = dir.path().to_string_lossy().to_string();

        let snapshot = FilesystemFetcher::new()
            .read_tree(&location, ReadTreeOptions::default())
            .await
            .unwrap();
        fs::remove_file(dir.path().join("src/a.rs")).unwrap();

        let error = snapshot.files()[0].content().await.unwrap_err();
        match &error {
            ScanError::Fetch { location: failed, message } => {
                assert_eq!(failed, &location);
                assert!(message.contains("src/a.rs"));
            }
            other => panic!("expected a fetch error, got {:?}", other),
        }
        assert!(error.to_string().contains(&location));
    }

    #[tokio::test]
    async fn test_missing_directory_is_fetch_error() {
        let result = FilesystemFetcher::new()
            .read_tree("/non/existent/todoscan/path", ReadTreeOptions::default())
            .await;
        assert!(matches!(result, Err(ScanError::Fetch { .. })));
    }
}
