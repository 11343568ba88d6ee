//! Test doubles for scanner unit tests
//!
//! These helpers are separate from integration test helpers in tests/common/ since unit tests
//! and integration tests run in different contexts.

use crate::scanner::error::{ScanError, ScanOutcome};
use crate::scanner::fetcher::{ContentFetcher, InMemoryFile, ReadTreeOptions, TreeFile, TreeSnapshot};
use crate::scanner::parser::{CommentParser, ParseError, TagCommentParser};
use crate::scanner::types::{ParsedMarker, SourceFile};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One scripted answer of a [`ScriptedFetcher`]
#[derive(Debug, Clone)]
pub enum Scripted {
    Snapshot {
        tag: String,
        files: Vec<(String, Vec<u8>)>,
    },
    NotModified,
    Fail(String),
}

impl Scripted {
    pub fn snapshot(tag: &str, files: &[(&str, &str)]) -> Self {
        Scripted::Snapshot {
            tag: tag.to_string(),
            files: files
                .iter()
                .map(|(path, content)| (path.to_string(), content.as_bytes().to_vec()))
                .collect(),
        }
    }

    pub fn raw_snapshot(tag: &str, files: Vec<(&str, Vec<u8>)>) -> Self {
        Scripted::Snapshot {
            tag: tag.to_string(),
            files: files
                .into_iter()
                .map(|(path, content)| (path.to_string(), content))
                .collect(),
        }
    }
}

/// Fetcher that replays scripted answers in order and records every call.
/// It ignores the filter it is given, so the scanner's own policy check is
/// what keeps excluded files out.
pub struct ScriptedFetcher {
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<(String, Option<String>)>>,
    delay: Duration,
}

impl ScriptedFetcher {
    pub fn new(script: Vec<Scripted>) -> Arc<Self> {
        Self::with_delay(script, Duration::ZERO)
    }

    pub fn with_delay(script: Vec<Scripted>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
            delay,
        })
    }

    /// `(location, version_tag)` of every read_tree call so far
    pub fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ContentFetcher for ScriptedFetcher {
    async fn read_tree(
        &self,
        location: &str,
        options: ReadTreeOptions,
    ) -> ScanOutcome<TreeSnapshot> {
        self.calls
            .lock()
            .unwrap()
            .push((location.to_string(), options.version_tag.clone()));
        let next = self.script.lock().unwrap().pop_front();

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match next {
            Some(Scripted::Snapshot { tag, files }) => {
                let files = files
                    .into_iter()
                    .map(|(path, content)| Box::new(InMemoryFile::new(path, content)) as Box<dyn TreeFile>)
                    .collect();
                Ok(TreeSnapshot::new(tag, files))
            }
            Some(Scripted::NotModified) => Err(ScanError::not_modified(location)),
            Some(Scripted::Fail(message)) => Err(ScanError::fetch(location, message)),
            None => Err(ScanError::fetch(location, "no scripted response left")),
        }
    }
}

/// Default parser that counts how many files it was asked to parse
#[derive(Default)]
pub struct CountingParser {
    inner: TagCommentParser,
    parsed: AtomicUsize,
}

impl CountingParser {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn parse_count(&self) -> usize {
        self.parsed.load(Ordering::SeqCst)
    }
}

impl CommentParser for CountingParser {
    fn parse(&self, file: &SourceFile<'_>) -> Result<Vec<ParsedMarker>, ParseError> {
        self.parsed.fetch_add(1, Ordering::SeqCst);
        self.inner.parse(file)
    }
}
