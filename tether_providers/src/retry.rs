use std::fmt::Display;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Delays between attempts; `delays.len()` is the number of retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    delays: Vec<Duration>,
}

impl RetryPolicy {
    /// No retries, fail on the first error.
    #[must_use]
    pub const fn none() -> Self {
        Self { delays: Vec::new() }
    }

    /// `retries` retries waiting `step`, `2 * step`, `3 * step`, ...
    #[must_use]
    pub fn linear(retries: u32, step: Duration) -> Self {
        Self {
            delays: (1..=retries).map(|i| step * i).collect(),
        }
    }

    #[must_use]
    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::linear(2, Duration::from_secs(2))
    }
}

/// Retry an async operation while `is_retryable` accepts its error.
///
/// # Returns
/// The first success, the first non-retryable error, or the last error once
/// every delay in the policy has been used.
pub async fn retry_with_backoff<F, Fut, T, E, R>(
    mut operation: F,
    policy: &RetryPolicy,
    is_retryable: R,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: Display,
    R: Fn(&E) -> bool,
{
    let total = policy.delays.len() + 1;
    let mut delays = policy.delays.iter();
    let mut attempt = 1_usize;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                let Some(delay) = delays.next().filter(|_| is_retryable(&e)) else {
                    return Err(e);
                };
                warn!(
                    "Request failed (attempt {attempt}/{total}): {e}. Retrying after {}ms...",
                    delay.as_millis()
                );
                sleep(*delay).await;
                attempt += 1;
            }
        }
    }
}
