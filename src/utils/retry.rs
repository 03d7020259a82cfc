use crate::utils::error::{HarnessError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Fixed-interval polling policy with an overall deadline.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub deadline: Duration,
}

impl RetryPolicy {
    pub const fn new(interval: Duration, deadline: Duration) -> Self {
        Self { interval, deadline }
    }
}

/// Repeatedly runs `attempt` until it yields a value or the deadline passes.
///
/// `Ok(Some(v))` ends the poll, `Ok(None)` retries after the interval, and
/// `Err` aborts immediately. Callers that want to retry through transient
/// failures convert them to `Ok(None)` themselves.
pub async fn poll<T, F, Fut>(waiting_for: &str, policy: RetryPolicy, mut attempt: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let started = Instant::now();
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        if let Some(value) = attempt().await? {
            tracing::debug!(
                "{} satisfied after {} attempt(s) in {:?}",
                waiting_for,
                attempts,
                started.elapsed()
            );
            return Ok(value);
        }

        if started.elapsed() + policy.interval > policy.deadline {
            return Err(HarnessError::TimeoutError {
                waiting_for: waiting_for.to_string(),
                elapsed_secs: policy.deadline.as_secs(),
            });
        }

        sleep(policy.interval).await;
    }
}
