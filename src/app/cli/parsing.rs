//! Comma-separated list handling and validation of list options

use crate::app::cli::config::ConfigError;
use crate::core::validation::{validate_extension, validate_glob_pattern, validate_tag};

use super::args::Args;

impl Args {
    /// Split comma-separated list options, drop duplicates and validate entries
    pub fn apply_enhanced_parsing(&mut self) -> Result<(), ConfigError> {
        self.locations = split_and_collect(&self.locations, false);
        self.tags = Self::parse_validated("tag", &self.tags, validate_tag)?;
        self.exclude = Self::parse_validated("exclude", &self.exclude, validate_glob_pattern)?;
        self.exclude_extensions = Self::parse_validated(
            "exclude-extensions",
            &self.exclude_extensions,
            validate_extension,
        )?;
        Ok(())
    }

    /// Parse comma-separated strings with deduplication
    pub fn parse_comma_separated_strings(strings: &[String]) -> Vec<String> {
        split_and_collect(strings, true)
    }

    fn parse_validated(
        option: &str,
        strings: &[String],
        validate: impl Fn(&str) -> Result<String, String>,
    ) -> Result<Vec<String>, ConfigError> {
        let mut validated = Vec::new();
        for part in Self::parse_comma_separated_strings(strings) {
            let value = validate(&part).map_err(|e| ConfigError::invalid(option, e))?;
            if !validated.contains(&value) {
                validated.push(value);
            }
        }
        Ok(validated)
    }
}

/// Trim values, dropping empties and duplicates. With `split`, each value is
/// first split on commas.
pub fn split_and_collect(values: &[String], split: bool) -> Vec<String> {
    let mut collected: Vec<String> = Vec::new();
    for value in values {
        let parts: Vec<&str> = if split {
            value.split(',').collect()
        } else {
            vec![value.as_str()]
        };
        for part in parts {
            let part = part.trim();
            if !part.is_empty() && !collected.iter().any(|c| c == part) {
                collected.push(part.to_string());
            }
        }
    }
    collected
}
