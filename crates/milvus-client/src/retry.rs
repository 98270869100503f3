use std::future::Future;
use std::time::Duration;

use milvus_core::MilvusError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// A policy that tries exactly once.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    /// Back-off before the retry that follows `attempt` (0-based).
    pub fn delay_for(&self, attempt: usize) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt as u32)
    }

    /// Run `op` until it succeeds, fails with a non-transient error, or the
    /// attempts are used up.
    pub async fn run<T, F, Fut>(&self, op: F) -> Result<T, MilvusError>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T, MilvusError>>,
    {
        self.run_when(MilvusError::is_transient, op).await
    }

    /// Like [`run`](Self::run), but only errors accepted by `retryable` are
    /// retried.
    pub async fn run_when<T, F, Fut, P>(
        &self,
        retryable: P,
        mut op: F,
    ) -> Result<T, MilvusError>
    where
        P: Fn(&MilvusError) -> bool,
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T, MilvusError>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut last_error = None;
        for attempt in 0..attempts {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if retryable(&e) && attempt + 1 < attempts => {
                    let delay = self.delay_for(attempt);
                    tracing::warn!(attempt, ?delay, error = %e, "retrying Milvus request");
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_error.unwrap_or_else(|| MilvusError::Transport("retry exhausted".to_string())))
    }
}
