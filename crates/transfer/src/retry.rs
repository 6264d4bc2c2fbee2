use std::future::Future;
use std::time::Duration;

use chunkdrop_protocol::constants::{MAX_RETRIES, RETRY_DELAY};

/// Bounded retry with a fixed delay between attempts.
///
/// An operation gets one attempt plus up to `max_retries` retries. Attempts
/// never overlap: the delay is awaited before the next one starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt fails.
    pub max_retries: u32,
    /// Pause between a failed attempt and the next one.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            delay: RETRY_DELAY,
        }
    }
}

/// Passed to the retry observer before each retry's delay starts.
#[derive(Debug)]
pub struct RetryNotice<'a, E> {
    /// 1-based number of the retry about to happen.
    pub retry: u32,
    pub max_retries: u32,
    /// Error of the attempt that just failed.
    pub error: &'a E,
    pub delay: Duration,
}

/// Every attempt failed.
#[derive(Debug)]
pub struct RetryExhausted<E> {
    /// Attempts made, first one included.
    pub attempts: u32,
    pub last_error: E,
}

impl RetryPolicy {
    /// Creates a policy.
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Total attempts this policy allows.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Runs `op` until it succeeds or the retry budget is spent.
    ///
    /// `op` receives the 1-based attempt number. `on_retry` is called once
    /// per retry, before the delay. No delay follows the final failure.
    pub async fn run<T, E, Op, Fut, N>(
        &self,
        mut op: Op,
        mut on_retry: N,
    ) -> Result<T, RetryExhausted<E>>
    where
        Op: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        N: FnMut(&RetryNotice<'_, E>),
    {
        let mut attempt: u32 = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(error) if attempt <= self.max_retries => {
                    on_retry(&RetryNotice {
                        retry: attempt,
                        max_retries: self.max_retries,
                        error: &error,
                        delay: self.delay,
                    });
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(error) => {
                    return Err(RetryExhausted {
                        attempts: attempt,
                        last_error: error,
                    });
                }
            }
        }
    }
}
