//! Error reporting helpers shared by the CLI and the scanner
//!
//! Errors that the user can fix (bad arguments, unreadable locations) are
//! reported with their own message. Everything else is reported with the
//! operation that failed, and the full error goes to the debug log.

/// Error that knows whether its message is meant for the user
///
/// When `is_user_actionable()` is `true`, `user_message()` must return
/// `Some`; otherwise it returns `None`.
pub trait ContextualError: std::error::Error {
    /// True for errors the user can act on: invalid options, a config file
    /// that does not parse, a location that cannot be read.
    fn is_user_actionable(&self) -> bool;

    /// Message to show the user for actionable errors
    fn user_message(&self) -> Option<&str>;
}

/// Log a fatal error at the detail level its kind calls for
///
/// # Examples
/// ```rust,no_run
/// use todoscan::core::error_handling::log_error_with_context;
/// use todoscan::scanner::api::ScanError;
///
/// let error = ScanError::Configuration {
///     message: "Invalid exclude pattern '[': unclosed character class".to_string(),
/// };
/// log_error_with_context(&error, "Building file policy");
/// // Logs: "FATAL: Invalid exclude pattern '[': unclosed character class"
///
/// let error = ScanError::Internal {
///     message: "scan task panicked".to_string(),
/// };
/// log_error_with_context(&error, "Scanning locations");
/// // Logs: "FATAL: Scanning locations"
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message().filter(|_| error.is_user_actionable()) {
        Some(message) => log::error!("FATAL: {}", message),
        None => log::error!("FATAL: {}", operation_context),
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

/// The line `log_error_with_context` leads with, for callers that print it
pub fn fatal_message<'a, E: ContextualError>(error: &'a E, operation_context: &'a str) -> &'a str {
    error
        .user_message()
        .filter(|_| error.is_user_actionable())
        .unwrap_or(operation_context)
}
