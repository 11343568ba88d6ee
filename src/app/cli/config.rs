//! TOML configuration file loading
//!
//! Keys mirror the long option names (`log-level`, `exclude-extensions`,
//! ...). A value from the file only fills an option the command line left
//! unset.

use crate::core::error_handling::ContextualError;
use crate::core::validation::{validate_byte_size, validate_url_template};
use std::path::{Path, PathBuf};

use super::args::Args;

/// Problem with the configuration file or an option value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ConfigError {
    message: String,
}

impl ConfigError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn missing(path: &Path) -> Self {
        Self::new(format!(
            "The specified configuration file does not exist: {}",
            path.display()
        ))
    }

    pub fn read(path: &Path, error: impl std::fmt::Display) -> Self {
        Self::new(format!(
            "Error reading configuration file {}: {}",
            path.display(),
            error
        ))
    }

    pub fn parse(path: &Path, error: impl std::fmt::Display) -> Self {
        Self::new(format!(
            "Error parsing configuration file {}: {}",
            path.display(),
            error
        ))
    }

    pub fn invalid(key: &str, reason: impl std::fmt::Display) -> Self {
        Self::new(format!("Invalid value for '{}': {}", key, reason))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<&str> {
        Some(&self.message)
    }
}

/// `<config_dir>/Todoscan/todoscan.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("Todoscan").join("todoscan.toml"))
}

impl Args {
    /// Read the config file named on the command line, or the default one if
    /// it exists. A named file that is missing is an error; a missing default
    /// file is not.
    pub async fn load_config_file(
        config_file: Option<&Path>,
    ) -> Result<Option<(PathBuf, toml::Table)>, ConfigError> {
        let path = match config_file {
            Some(path) if path.exists() => path.to_path_buf(),
            Some(path) => return Err(ConfigError::missing(path)),
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(None),
            },
        };

        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ConfigError::read(&path, e))?;
        let table = toml::from_str::<toml::Table>(&contents)
            .map_err(|e| ConfigError::parse(&path, e))?;
        Ok(Some((path, table)))
    }

    /// Fill options left unset on the command line from a parsed config table
    pub fn apply_toml_values(args: &mut Self, config: &toml::Table) -> Result<(), ConfigError> {
        if args.locations.is_empty() {
            args.locations = string_list(config, "locations")?;
        }
        if args.tags.is_empty() {
            args.tags = string_list(config, "tag")?;
        }
        if args.exclude.is_empty() {
            args.exclude = string_list(config, "exclude")?;
        }
        if args.exclude_extensions.is_empty() {
            args.exclude_extensions = string_list(config, "exclude-extensions")?;
        }
        if args.filters.is_empty() {
            args.filters = string_list(config, "filter")?;
        }

        fill(&mut args.fetcher, choice(config, "fetcher", &["auto", "fs", "git"])?);
        fill(&mut args.format, choice(config, "format", &["text", "json", "csv"])?);
        fill(
            &mut args.log_level,
            choice(
                config,
                "log-level",
                &["trace", "debug", "info", "warn", "error", "off"],
            )?,
        );
        fill(
            &mut args.log_format,
            choice(config, "log-format", &["text", "ext", "json"])?,
        );
        fill(&mut args.order_by, string_value(config, "order-by")?);
        fill(
            &mut args.log_file,
            string_value(config, "log-file")?.map(PathBuf::from),
        );

        if let Some(template) = string_value(config, "view-url")? {
            let template =
                validate_url_template(&template).map_err(|e| ConfigError::invalid("view-url", e))?;
            fill(&mut args.view_url, Some(template));
        }

        fill(&mut args.max_file_size, byte_size(config, "max-file-size")?);
        fill(&mut args.cache_capacity, positive(config, "cache-capacity")?);
        fill(&mut args.limit, positive(config, "limit")?);
        fill(&mut args.watch, positive(config, "watch")?);
        fill(&mut args.offset, integer(config, "offset")?);
        fill(&mut args.retries, integer(config, "retries")?);

        if let Some(value) = config.get("color") {
            let color = value
                .as_bool()
                .ok_or_else(|| ConfigError::invalid("color", "expected true or false"))?;
            args.config_color = Some(color);
        }

        Ok(())
    }
}

fn fill<T>(target: &mut Option<T>, value: Option<T>) {
    if target.is_none() {
        *target = value;
    }
}

fn string_value(config: &toml::Table, key: &str) -> Result<Option<String>, ConfigError> {
    match config.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| ConfigError::invalid(key, "expected a string")),
    }
}

/// A single string or an array of strings
fn string_list(config: &toml::Table, key: &str) -> Result<Vec<String>, ConfigError> {
    match config.get(key) {
        None => Ok(Vec::new()),
        Some(toml::Value::String(s)) => Ok(vec![s.clone()]),
        Some(toml::Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| ConfigError::invalid(key, "expected an array of strings"))
            })
            .collect(),
        Some(_) => Err(ConfigError::invalid(
            key,
            "expected a string or an array of strings",
        )),
    }
}

fn choice(
    config: &toml::Table,
    key: &str,
    choices: &[&str],
) -> Result<Option<String>, ConfigError> {
    match string_value(config, key)? {
        Some(value) if choices.contains(&value.as_str()) => Ok(Some(value)),
        Some(value) => Err(ConfigError::invalid(
            key,
            format!("'{}' is not one of {}", value, choices.join(", ")),
        )),
        None => Ok(None),
    }
}

fn integer(config: &toml::Table, key: &str) -> Result<Option<usize>, ConfigError> {
    match config.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_integer()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| ConfigError::invalid(key, "expected a non-negative integer")),
    }
}

fn positive(config: &toml::Table, key: &str) -> Result<Option<usize>, ConfigError> {
    match integer(config, key)? {
        Some(0) => Err(ConfigError::invalid(key, "value must be greater than 0")),
        other => Ok(other),
    }
}

/// Integer bytes, or a string with an optional k/m suffix
fn byte_size(config: &toml::Table, key: &str) -> Result<Option<u64>, ConfigError> {
    match config.get(key) {
        None => Ok(None),
        Some(toml::Value::String(s)) => validate_byte_size(s)
            .map(Some)
            .map_err(|e| ConfigError::invalid(key, e)),
        Some(value) => match value.as_integer().and_then(|n| u64::try_from(n).ok()) {
            Some(0) | None => Err(ConfigError::invalid(key, "expected a positive size")),
            Some(n) => Ok(Some(n)),
        },
    }
}
