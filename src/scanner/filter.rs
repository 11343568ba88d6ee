//! File Policy
//!
//! Decides which files of a fetched tree are eligible for marker parsing.
//! Paths are `/`-separated and relative to the tree root.

use crate::scanner::error::{ScanError, ScanOutcome};
use crate::scanner::types::FileInfo;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Default maximum file size in bytes
pub const DEFAULT_MAX_FILE_SIZE: u64 = 200_000;

/// Extensions that never carry parseable source text
pub const DEFAULT_DENIED_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "webp", "tif", "tiff", "ico", "icns", "svg", "lock",
    "woff", "woff2", "ttf", "eot", "otf", "zip", "gz", "tgz", "jar", "pdf", "mp4", "mov", "mp3",
    "wav",
];

/// Lock files that do not use the `.lock` extension
const DENIED_FILE_NAMES: &[&str] = &["package-lock.json", "npm-shrinkwrap.json", "pnpm-lock.yaml"];

/// Caller-supplied path predicate
pub type PathPredicate = Arc<dyn Fn(&str, &FileInfo) -> bool + Send + Sync>;

/// Per-file inclusion policy applied before a file is read
#[derive(Clone)]
pub struct FilePolicy {
    max_file_size: u64,
    denied_extensions: HashSet<String>,
    exclude_patterns: Vec<glob::Pattern>,
    predicate: Option<PathPredicate>,
}

impl fmt::Debug for FilePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePolicy")
            .field("max_file_size", &self.max_file_size)
            .field("denied_extensions", &self.denied_extensions.len())
            .field("exclude_patterns", &self.exclude_patterns)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}

impl Default for FilePolicy {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            denied_extensions: DEFAULT_DENIED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            exclude_patterns: Vec::new(),
            predicate: None,
        }
    }
}

impl FilePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum accepted file size in bytes
    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    /// Add extensions to the deny-list (leading dots and case are ignored)
    pub fn with_denied_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for ext in extensions {
            let ext = ext.as_ref().trim_start_matches('.').to_lowercase();
            if !ext.is_empty() {
                self.denied_extensions.insert(ext);
            }
        }
        self
    }

    /// Add glob patterns matched against the relative path
    pub fn with_exclude_patterns<I, S>(mut self, patterns: I) -> ScanOutcome<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let compiled = glob::Pattern::new(pattern).map_err(|e| ScanError::Configuration {
                message: format!("Invalid exclude pattern '{}': {}", pattern, e),
            })?;
            self.exclude_patterns.push(compiled);
        }
        Ok(self)
    }

    /// Install a caller-supplied predicate; files it rejects are skipped
    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str, &FileInfo) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Decide whether a file should be read and parsed
    pub fn accepts(&self, path: &str, info: &FileInfo) -> bool {
        if is_hidden(path) {
            return false;
        }
        if self.is_denied_type(path) {
            return false;
        }
        if info.size > self.max_file_size {
            return false;
        }
        if self.exclude_patterns.iter().any(|p| p.matches(path)) {
            return false;
        }
        match &self.predicate {
            Some(predicate) => predicate(path, info),
            None => true,
        }
    }

    fn is_denied_type(&self, path: &str) -> bool {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        if DENIED_FILE_NAMES.contains(&file_name) {
            return true;
        }
        // Every dotted suffix counts, so `min.js` matches `app.min.js`
        file_name
            .char_indices()
            .filter(|&(idx, c)| c == '.' && idx > 0)
            .any(|(idx, _)| {
                self.denied_extensions
                    .contains(&file_name[idx + 1..].to_lowercase())
            })
    }
}

/// True if any path segment starts with `.`
pub fn is_hidden(path: &str) -> bool {
    path.split('/').any(|segment| segment.starts_with('.'))
}
