//! Retrying embedding requests with exponential backoff.

use std::future::Future;
use std::time::{Duration, Instant};

use backoff::{backoff::Backoff, ExponentialBackoff};

use super::config::EmbeddingConfig;
use super::errors::{EmbeddingError, RetryError};

/// How often and how patiently a request is retried.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts including the first one.
    pub max_attempts: usize,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Wall-clock budget across all attempts.
    pub budget: Duration,
    /// Wait as long as a 429 response asks instead of the backoff delay.
    pub honor_retry_after: bool,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(10),
            budget: Duration::from_secs(120),
            honor_retry_after: true,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Policy for a client: `max_retries` attempts within four request timeouts.
    pub fn for_client(config: &EmbeddingConfig) -> Self {
        Self {
            max_attempts: config.max_retries.max(1),
            budget: config.timeout * 4,
            ..Default::default()
        }
    }

    pub fn with_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn honoring_retry_after(mut self, honor: bool) -> Self {
        self.honor_retry_after = honor;
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            current_interval: self.initial_delay,
            initial_interval: self.initial_delay,
            max_interval: self.max_delay,
            max_elapsed_time: Some(self.budget),
            randomization_factor: if self.jitter { 0.5 } else { 0.0 },
            ..Default::default()
        }
    }

    /// Run `request` until it succeeds, fails permanently, or the policy gives up.
    pub async fn run<F, Fut, T>(&self, mut request: F) -> Result<T, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, EmbeddingError>>,
    {
        let started = Instant::now();
        let mut backoff = self.backoff();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let error = match request().await {
                Ok(value) => return Ok(value),
                Err(error) if !error.is_retryable() => {
                    return Err(RetryError::NonRetryable { source: error })
                }
                Err(error) => error,
            };

            if attempt >= self.max_attempts {
                return Err(RetryError::MaxAttemptsExceeded { last: error });
            }

            let server_delay = error
                .retry_after_seconds()
                .filter(|_| self.honor_retry_after)
                .map(Duration::from_secs);
            let Some(delay) = server_delay.or_else(|| backoff.next_backoff()) else {
                return Err(RetryError::TimeoutExceeded);
            };
            if started.elapsed() + delay > self.budget {
                return Err(RetryError::TimeoutExceeded);
            }

            tracing::warn!(attempt, error = %error, delay = ?delay, "embedding request failed, retrying");
            tokio::time::sleep(delay).await;
        }
    }
}
