//! engine::retry
//!
//! Bounded retry with a fixed delay.
//!
//! The policy is plain configuration consumed by a generic combinator, so
//! retry behavior is testable with an injected attempt function and no git
//! anywhere in sight.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::sleep;
use tracing::warn;

/// Classifies errors the retry combinator must not retry.
pub trait Retryable {
    /// True for configuration problems where retrying cannot help.
    fn is_fatal(&self) -> bool;
}

/// How often and how patiently to retry an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first (always at least 1).
    pub max_attempts: u32,
    /// Fixed delay between consecutive attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Run `attempt` until it succeeds, fails fatally, or the budget is
    /// spent. The attempt function receives the 1-based attempt number.
    pub async fn run<T, E, F, Fut>(&self, mut attempt: F) -> Result<T, RetryError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + fmt::Display,
    {
        let attempts = self.max_attempts.max(1);
        let mut number = 1;
        loop {
            match attempt(number).await {
                Ok(value) => return Ok(value),
                Err(error) if error.is_fatal() => return Err(RetryError::Fatal(error)),
                Err(error) => {
                    if number >= attempts {
                        return Err(RetryError::Exhausted {
                            attempts: number,
                            error,
                        });
                    }
                    warn!(attempt = number, error = %error, "attempt failed, retrying");
                    sleep(self.delay).await;
                    number += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

/// Terminal result of a retried operation that never succeeded.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// The attempt failed in a way retrying cannot fix.
    #[error("not retried: {0}")]
    Fatal(E),

    /// Every attempt in the budget failed; carries the last error.
    #[error("gave up after {attempts} attempts: {error}")]
    Exhausted {
        /// How many attempts were made
        attempts: u32,
        /// The error from the final attempt
        error: E,
    },
}
