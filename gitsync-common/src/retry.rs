//! Cancelable retry with pluggable backoff.
//!
//! The delay function maps a zero-based attempt index to the wait
//! before the next attempt. Operations signal unrecoverable failures by
//! wrapping the cause in [`Failure::Cancel`], which stops the loop
//! immediately.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Outcome of a failed attempt, as reported by the operation.
#[derive(Debug)]
pub enum Failure<E> {
    /// Transient failure; retry after the backoff delay.
    Retry(E),
    /// Unrecoverable failure; stop retrying and surface the cause.
    Cancel(E),
}

/// Terminal result of a retry loop that never succeeded.
#[derive(Debug, Error)]
pub enum RetryError<E: std::error::Error> {
    /// The cancellation token fired before or between attempts.
    #[error("cancelled by context")]
    ContextCanceled,
    /// The operation asked to stop via [`Failure::Cancel`].
    #[error(transparent)]
    Canceled(E),
    /// Every attempt failed; carries the last error.
    #[error(transparent)]
    Exhausted(E),
}

impl<E: std::error::Error> RetryError<E> {
    /// The underlying cause, when one exists.
    pub fn cause(&self) -> Option<&E> {
        match self {
            RetryError::ContextCanceled => None,
            RetryError::Canceled(e) | RetryError::Exhausted(e) => Some(e),
        }
    }
}

/// Run `op` at attempts `0..=max_retries`, waiting `delay(attempt)`
/// between failed attempts. The wait is interruptible by `cancel`.
pub async fn retry<T, E, F, Fut>(
    cancel: &CancellationToken,
    max_retries: u32,
    delay: impl Fn(u32) -> Duration,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    E: std::error::Error,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Failure<E>>>,
{
    let mut last = None;
    for attempt in 0..=max_retries {
        if cancel.is_cancelled() {
            return Err(RetryError::ContextCanceled);
        }
        match op().await {
            Ok(value) => return Ok(value),
            Err(Failure::Cancel(cause)) => return Err(RetryError::Canceled(cause)),
            Err(Failure::Retry(err)) => {
                let wait = delay(attempt);
                debug!(
                    error = %err,
                    attempt,
                    next_attempt_in = ?wait,
                    "retryable operation failed"
                );
                last = Some(err);
                if attempt < max_retries {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(RetryError::ContextCanceled),
                        _ = tokio::time::sleep(wait) => {}
                    }
                }
            }
        }
    }
    Err(RetryError::Exhausted(last.expect("at least one attempt ran")))
}

/// The same delay for every attempt.
pub fn constant_backoff(delay: Duration) -> impl Fn(u32) -> Duration + Clone {
    move |_| delay
}

/// `initial + attempt * increment`.
pub fn linear_backoff(initial: Duration, increment: Duration) -> impl Fn(u32) -> Duration + Clone {
    move |attempt| initial.saturating_add(increment.saturating_mul(attempt))
}

/// `min * 2^attempt`, capped at `max` (also when the multiplication
/// would overflow).
pub fn exponential_backoff(min: Duration, max: Duration) -> impl Fn(u32) -> Duration + Clone {
    move |attempt| {
        2u32.checked_pow(attempt)
            .and_then(|mult| min.checked_mul(mult))
            .unwrap_or(max)
            .min(max)
    }
}

/// Scale the delay by a uniform random factor in `[0, 1)`.
pub fn with_full_jitter<F>(delay: F) -> impl Fn(u32) -> Duration
where
    F: Fn(u32) -> Duration,
{
    move |attempt| delay(attempt).mul_f64(fastrand::f64())
}

/// Add `min(delay / 2, max_jitter)` scaled by a uniform random factor.
pub fn with_jitter<F>(delay: F, max_jitter: Duration) -> impl Fn(u32) -> Duration
where
    F: Fn(u32) -> Duration,
{
    move |attempt| {
        let base = delay(attempt);
        let jitter = (base / 2).min(max_jitter).mul_f64(fastrand::f64());
        base.saturating_add(jitter)
    }
}
