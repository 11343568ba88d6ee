//! Retry helper for transient failures in async operations

use std::time::Duration;
use tokio::time::sleep;

/// How often, and how far apart, an operation is attempted
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub delay: Duration,
}

impl RetryPolicy {
    /// Policy that tries once and never retries
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(500),
        }
    }
}

/// Run `operation` until it succeeds, returns an error `is_transient` rejects,
/// or the policy's attempts are used up. The last error is returned.
///
/// # Examples
/// ```rust
/// use todoscan::core::retry::{retry_async, RetryPolicy};
///
/// # async fn example() -> Result<usize, String> {
/// let markers = retry_async(
///     "scan 'repo'",
///     RetryPolicy::default(),
///     |_: &String| true,
///     || async { Ok::<usize, String>(3) },
/// )
/// .await?;
/// # Ok(markers)
/// # }
/// ```
pub async fn retry_async<F, T, E, Fut>(
    operation_name: &str,
    policy: RetryPolicy,
    is_transient: impl Fn(&E) -> bool,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(error) if attempt < max_attempts && is_transient(&error) => {
                log::debug!(
                    "Operation '{}' failed on attempt {}/{}, retrying in {:?}: {}",
                    operation_name,
                    attempt,
                    max_attempts,
                    policy.delay,
                    error
                );
                sleep(policy.delay).await;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}
