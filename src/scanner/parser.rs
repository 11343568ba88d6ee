//! Comment Parser
//!
//! Extracts marker comments (`TODO`, `FIXME`, ...) from file content. The
//! scanner talks to parsers through the [`CommentParser`] trait so alternative
//! syntaxes can be plugged in.

use crate::scanner::error::{ScanError, ScanOutcome};
use crate::scanner::types::{ParsedMarker, SourceFile};
use regex::Regex;

/// Tags recognised when none are configured
pub const DEFAULT_TAGS: &[&str] = &["TODO", "FIXME"];

/// Per-file parse failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("content is not valid UTF-8 (at byte {offset})")]
    Encoding { offset: usize },

    #[error("content looks binary")]
    Binary,

    #[error("{message}")]
    Other { message: String },
}

/// Turns file content into marker records
pub trait CommentParser: Send + Sync {
    fn parse(&self, file: &SourceFile<'_>) -> Result<Vec<ParsedMarker>, ParseError>;
}

/// Line-oriented parser for `<leader> TAG(author): text` comments
///
/// A tag only counts when it follows a comment leader on the same line:
/// `//`, `#`, `/*`, `*`, `<!--`, `--`, `;` or `%`.
#[derive(Debug, Clone)]
pub struct TagCommentParser {
    tags: Vec<String>,
    pattern: Regex,
}

impl TagCommentParser {
    /// Build a parser for the given tags
    pub fn new<I, S>(tags: I) -> ScanOutcome<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tags: Vec<String> = tags
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        if tags.is_empty() {
            return Err(ScanError::Configuration {
                message: "At least one marker tag is required".to_string(),
            });
        }

        let alternation = tags
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(
            r"(?://+|#+|/\*+|\*|<!--|--|;+|%)\s*(?P<tag>{})\b(?:\((?P<author>[^)]*)\))?\s*[:\-]?\s*(?P<text>.*)$",
            alternation
        );
        let pattern = Regex::new(&pattern).map_err(|e| ScanError::Configuration {
            message: format!("Invalid marker tags {:?}: {}", tags, e),
        })?;

        Ok(Self { tags, pattern })
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    fn parse_line(&self, line: &str, line_number: usize) -> Option<ParsedMarker> {
        let captures = self.pattern.captures(line)?;
        let tag = captures.name("tag")?.as_str().to_string();
        let author = captures
            .name("author")
            .map(|a| a.as_str().trim())
            .filter(|a| !a.is_empty())
            .map(str::to_string);
        let text = captures.name("text").map_or("", |t| t.as_str());

        Some(ParsedMarker {
            text: clean_text(text),
            tag,
            author,
            line_number,
        })
    }
}

impl Default for TagCommentParser {
    fn default() -> Self {
        Self::new(DEFAULT_TAGS).expect("default marker tags are valid")
    }
}

impl CommentParser for TagCommentParser {
    fn parse(&self, file: &SourceFile<'_>) -> Result<Vec<ParsedMarker>, ParseError> {
        if file.content.contains(&0) {
            return Err(ParseError::Binary);
        }
        let text = std::str::from_utf8(file.content).map_err(|e| ParseError::Encoding {
            offset: e.valid_up_to(),
        })?;

        Ok(text
            .lines()
            .enumerate()
            .filter_map(|(idx, line)| self.parse_line(line, idx + 1))
            .collect())
    }
}

// Strip block comment terminators left on the line
fn clean_text(text: &str) -> String {
    let mut text = text.trim();
    for terminator in ["*/", "-->"] {
        if let Some(stripped) = text.strip_suffix(terminator) {
            text = stripped.trim_end();
        }
    }
    text.to_string()
}
