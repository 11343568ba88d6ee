//! Common test utilities: temporary source trees and git work trees

#![allow(dead_code)]

use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Temporary directory populated with source files
pub struct TestTree {
    dir: TempDir,
}

impl TestTree {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    /// Create a tree from `(relative path, content)` pairs
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let tree = Self::new();
        for (path, content) in files {
            tree.write(path, content);
        }
        tree
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(path, content).expect("write test file");
    }

    pub fn remove(&self, relative: &str) {
        std::fs::remove_file(self.dir.path().join(relative)).expect("remove test file");
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn location(&self) -> String {
        self.dir.path().to_string_lossy().to_string()
    }

    /// `git init` the tree. Returns false when git is not installed.
    pub fn git_init(&self) -> bool {
        self.git(&["init", "--quiet"])
    }

    /// Stage everything and commit. Returns false when git is not installed.
    pub fn git_commit_all(&self, message: &str) -> bool {
        self.git(&["add", "--all"])
            && self.git(&[
                "-c",
                "user.name=Test",
                "-c",
                "user.email=test@example.com",
                "-c",
                "commit.gpgsign=false",
                "commit",
                "--quiet",
                "-m",
                message,
            ])
    }

    fn git(&self, args: &[&str]) -> bool {
        Command::new("git")
            .args(args)
            .current_dir(self.dir.path())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}
