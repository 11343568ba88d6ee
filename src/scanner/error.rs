//! Scanner Error Types

/// Scanner error types
///
/// Errors are `Clone` because a single in-flight scan hands the same outcome
/// to every caller that coalesced onto it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    /// Upstream content is unchanged since the supplied version tag
    #[error("Content at '{location}' not modified")]
    NotModified { location: String },

    /// Fetching the tree or a file's content failed
    #[error("Failed to fetch '{location}': {message}")]
    Fetch { location: String, message: String },

    /// A single file could not be parsed for markers
    #[error("Failed to parse '{path}': {message}")]
    Parse { path: String, message: String },

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Internal failure (poisoned lock, panicked scan task)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ScanError {
    /// Build a fetch error for a location
    pub fn fetch(location: &str, message: impl Into<String>) -> Self {
        ScanError::Fetch {
            location: location.to_string(),
            message: message.into(),
        }
    }

    /// Build a not-modified signal for a location
    pub fn not_modified(location: &str) -> Self {
        ScanError::NotModified {
            location: location.to_string(),
        }
    }

    /// True when this error is the expected "content unchanged" signal
    pub fn is_not_modified(&self) -> bool {
        matches!(self, ScanError::NotModified { .. })
    }

    /// True for failures a later attempt may not repeat
    pub fn is_transient(&self) -> bool {
        matches!(self, ScanError::Fetch { .. } | ScanError::Internal { .. })
    }
}

impl crate::core::error_handling::ContextualError for ScanError {
    fn is_user_actionable(&self) -> bool {
        match self {
            ScanError::Configuration { .. } => true, // User can fix config issues
            ScanError::Fetch { .. } => true,         // Usually a bad location or permissions
            ScanError::NotModified { .. } => false,
            ScanError::Parse { .. } => false,
            ScanError::Internal { .. } => false,
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ScanError::Configuration { message } => Some(message),
            ScanError::Fetch { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Result type for scanner operations
pub type ScanOutcome<T> = Result<T, ScanError>;
