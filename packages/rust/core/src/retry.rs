//! Bounded retry combinator.
//!
//! [`retry_with_policy`] runs a fallible async operation up to
//! [`RetryPolicy::max_attempts`] times and reports either the first success or
//! the last error once attempts are exhausted. It does not log; callers
//! observe each failure through the attempt number handed to the operation.

use std::future::Future;
use std::time::Duration;

/// How many times to try, and how long to wait between tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Values below 1 are treated as 1.
    pub max_attempts: u32,
    /// Fixed pause after each failed attempt except the last.
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::ZERO)
    }
}

/// All attempts failed.
#[derive(Debug)]
pub struct Exhausted<E> {
    /// Number of attempts made.
    pub attempts: u32,
    /// Error from the final attempt.
    pub last_error: E,
}

/// Run `operation` until it succeeds or the policy's attempts run out.
///
/// `operation` receives the 1-based attempt number. No attempt is made after
/// the first success.
pub async fn retry_with_policy<T, E, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, Exhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.attempts();
    let mut attempt = 1;
    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= max_attempts => {
                return Err(Exhausted {
                    attempts: attempt,
                    last_error: err,
                });
            }
            Err(_) => {
                if !policy.delay.is_zero() {
                    tokio::time::sleep(policy.delay).await;
                }
                attempt += 1;
            }
        }
    }
}
