//! Mutex poisoning helpers

use std::sync::LockResult;

/// Turn a poisoned lock into an application error
///
/// # Examples
/// ```
/// use std::sync::Mutex;
/// use todoscan::core::sync::handle_mutex_poison;
/// use todoscan::scanner::api::ScanError;
///
/// let mutex = Mutex::new(42);
/// let guard = handle_mutex_poison(
///     mutex.lock(),
///     |message| ScanError::Internal { message }
/// ).unwrap();
/// assert_eq!(*guard, 42);
/// ```
pub fn handle_mutex_poison<T, E>(
    result: LockResult<T>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<T, E> {
    result.map_err(|poison_err| {
        error_constructor(format!(
            "Internal synchronisation error (mutex poisoned by a panic while locked): {:?}",
            poison_err
        ))
    })
}
