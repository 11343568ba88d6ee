//! Core CLI arguments structure and basic functionality
//!
//! Comma-separated list handling lives in `parsing`, config file loading in
//! `config`.

use crate::app::output::OutputFormat;
use crate::core::logging::LogFormat;
use crate::core::retry::RetryPolicy;
use crate::core::validation::{
    validate_byte_size, validate_positive_int, validate_url_template,
};
use crate::scanner::error::{ScanError, ScanOutcome};
use crate::scanner::fetcher::FetcherKind;
use crate::scanner::query::{FieldFilter, ListQuery, OrderBy};
use clap::{ArgAction, Parser};
use std::borrow::Cow;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

/// Delay between caller-side retries of a failed scan
pub const RETRY_DELAY: Duration = Duration::from_millis(500);

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "todoscan")]
#[command(about = "Find TODO and FIXME comments across source trees")]
#[command(version, long_version = crate::core::version::long_version())]
#[command(after_help = " * can be specified multiple times or as a comma-separated list")]
pub struct Args {
    /// Directories, git work trees or file:// URLs to scan (default: .)
    #[arg(value_name = "LOCATIONS")]
    pub locations: Vec<String>,

    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// How trees are read
    #[arg(long = "fetcher", value_name = "KIND", value_parser = ["auto", "fs", "git"])]
    pub fetcher: Option<String>,

    /// Marker tags to look for* (default: TODO,FIXME)
    #[arg(short = 't', long = "tag", value_name = "TAGS", action = ArgAction::Append)]
    pub tags: Vec<String>,

    /// Glob patterns of paths to skip*
    #[arg(short = 'x', long = "exclude", value_name = "GLOBS", action = ArgAction::Append)]
    pub exclude: Vec<String>,

    /// File extensions to skip in addition to the built-in list*
    #[arg(long = "exclude-extensions", value_name = "EXTS", action = ArgAction::Append)]
    pub exclude_extensions: Vec<String>,

    /// Largest file to parse, in bytes (k/m suffixes accepted)
    #[arg(long = "max-file-size", value_name = "BYTES", value_parser = validate_byte_size)]
    pub max_file_size: Option<u64>,

    /// View URL template ({location}, {path}, {line})
    #[arg(long = "view-url", value_name = "TEMPLATE", value_parser = validate_url_template)]
    pub view_url: Option<String>,

    /// Maximum number of cached scans
    #[arg(long = "cache-capacity", value_name = "COUNT", value_parser = validate_positive_int)]
    pub cache_capacity: Option<usize>,

    /// Output format
    #[arg(short = 'F', long = "format", value_name = "FORMAT", value_parser = ["text", "json", "csv"])]
    pub format: Option<String>,

    /// Sort markers by field (text, tag, author, path, url), optionally =asc or =desc
    #[arg(short = 'O', long = "order-by", value_name = "FIELD[=DIR]")]
    pub order_by: Option<String>,

    /// Keep only markers whose field contains the value (repeatable)
    #[arg(long = "filter", value_name = "FIELD=VALUE", action = ArgAction::Append)]
    pub filters: Vec<String>,

    /// Skip this many markers per location
    #[arg(long = "offset", value_name = "COUNT")]
    pub offset: Option<usize>,

    /// Show at most this many markers per location
    #[arg(short = 'n', long = "limit", value_name = "COUNT", value_parser = validate_positive_int)]
    pub limit: Option<usize>,

    /// Retry a failed scan this many times
    #[arg(long = "retries", value_name = "COUNT")]
    pub retries: Option<usize>,

    /// Rescan every SECONDS and reprint when markers change, until Ctrl-C
    #[arg(short = 'w', long = "watch", value_name = "SECONDS", value_parser = validate_positive_int)]
    pub watch: Option<usize>,

    /// Force coloured output
    #[arg(long = "color", conflicts_with = "no_color")]
    pub color: bool,

    /// Disable coloured output
    #[arg(long = "no-color", conflicts_with = "color")]
    pub no_color: bool,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log output format
    #[arg(long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Set when a config file supplied `color`
    #[arg(skip)]
    pub config_color: Option<bool>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locations to scan, defaulting to the current directory
    pub fn normalized_locations(&self) -> Cow<'_, [String]> {
        if self.locations.is_empty() {
            Cow::Owned(vec![".".to_string()])
        } else {
            Cow::Borrowed(&self.locations)
        }
    }

    /// Command line flags win, then the config file, then TTY detection
    pub fn use_color(&self) -> bool {
        if self.color {
            true
        } else if self.no_color {
            false
        } else {
            self.config_color
                .unwrap_or_else(|| std::io::stdout().is_terminal())
        }
    }

    pub fn fetcher_kind(&self) -> ScanOutcome<FetcherKind> {
        self.fetcher
            .as_deref()
            .map_or(Ok(FetcherKind::Auto), |kind| kind.parse())
    }

    pub fn output_format(&self) -> OutputFormat {
        self.format
            .as_deref()
            .and_then(|f| f.parse().ok())
            .unwrap_or_default()
    }

    pub fn log_format(&self) -> LogFormat {
        self.log_format
            .as_deref()
            .and_then(|f| f.parse().ok())
            .unwrap_or_default()
    }

    /// Log file path, with `none` meaning no file
    pub fn log_file_path(&self) -> Option<String> {
        self.log_file
            .as_ref()
            .filter(|p| !p.as_os_str().eq_ignore_ascii_case("none"))
            .map(|p| p.to_string_lossy().to_string())
    }

    /// Query applied to every location's result before printing
    pub fn list_query(&self) -> ScanOutcome<ListQuery> {
        Ok(ListQuery {
            offset: self.offset.unwrap_or(0),
            limit: self.limit,
            order_by: self
                .order_by
                .as_deref()
                .map(|order| order.parse::<OrderBy>())
                .transpose()?,
            filters: self
                .filters
                .iter()
                .map(|filter| filter.parse::<FieldFilter>())
                .collect::<Result<Vec<_>, ScanError>>()?,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        match self.retries {
            Some(retries) if retries > 0 => RetryPolicy {
                max_attempts: retries + 1,
                delay: RETRY_DELAY,
            },
            _ => RetryPolicy::none(),
        }
    }

    pub fn watch_interval(&self) -> Option<Duration> {
        self.watch.map(|secs| Duration::from_secs(secs as u64))
    }
}
