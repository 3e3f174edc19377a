//! Retry logic.
//!
//! # Responsibilities
//! - Determine if a response or failure is retryable
//! - Execute retries with server-directed or jittered delay
//! - Honour cancellation while waiting
//!
//! # Design Decisions
//! - Retryable statuses: 408, 429, 500, 502, 503, 504; everything else returns at once
//! - Connection errors and timeouts always retryable; other failures propagate at once
//! - `Retry-After` (seconds) beats jitter; jitter sequence drawn once per call
//! - No delay after the final attempt
//! - Exhaustion by status returns the last response; exhaustion by failure raises the last error

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::config::RetryConfig;
use crate::error::{NavigatorError, NavigatorResult};
use crate::http::{HttpRequest, HttpResponse, Next, Stage};
use crate::lifecycle::Cancellation;
use crate::observability::metrics;
use crate::resilience::jitter::Jitter;

/// Hard upper bound on attempts per call.
pub const MAX_ATTEMPTS: u32 = 10;

/// Status codes worth another attempt.
pub const RETRYABLE_STATUS_CODES: [StatusCode; 6] = [
    StatusCode::REQUEST_TIMEOUT,
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

/// True if the status code is in [`RETRYABLE_STATUS_CODES`].
pub fn is_retryable_status(status: StatusCode) -> bool {
    RETRYABLE_STATUS_CODES.contains(&status)
}

/// Attempt budget and jitter bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub seed_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            seed_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(120),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.clamp(1, MAX_ATTEMPTS),
            seed_delay: Duration::from_millis(config.seed_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms.max(config.seed_delay_ms)),
        }
    }
}

/// Pipeline stage that retries transient failures.
pub struct RetryStage {
    policy: RetryPolicy,
    jitter: Arc<dyn Jitter>,
    cancel: Cancellation,
    repository: String,
}

impl RetryStage {
    pub fn new(
        policy: RetryPolicy,
        jitter: Arc<dyn Jitter>,
        cancel: Cancellation,
        repository: impl Into<String>,
    ) -> Self {
        Self {
            policy,
            jitter,
            cancel,
            repository: repository.into(),
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    fn jitter_delay(&self, delays: &mut Option<Vec<Duration>>, attempt: u32) -> Duration {
        let delays = delays.get_or_insert_with(|| {
            self.jitter
                .sequence(self.policy.max_attempts, self.policy.seed_delay, self.policy.max_delay)
                .collect()
        });
        delays
            .get(attempt as usize)
            .copied()
            .unwrap_or(self.policy.max_delay)
    }

    async fn wait(&self, delay: Duration) -> NavigatorResult<()> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(NavigatorError::Cancelled),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }

    async fn attempt(&self, request: HttpRequest, next: Next<'_>) -> NavigatorResult<HttpResponse> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(NavigatorError::Cancelled),
            result = next.run(request) => result,
        }
    }
}

#[async_trait]
impl Stage for RetryStage {
    async fn handle(&self, request: HttpRequest, next: Next<'_>) -> NavigatorResult<HttpResponse> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut delays: Option<Vec<Duration>> = None;
        let mut attempt: u32 = 0;

        loop {
            let is_last = attempt + 1 >= max_attempts;

            match self.attempt(request.clone(), next).await {
                Ok(response) if !is_retryable_status(response.status) => return Ok(response),
                Ok(response) => {
                    if is_last {
                        tracing::warn!(
                            repository = %self.repository,
                            request_id = %request.request_id,
                            attempt = attempt + 1,
                            max_attempts,
                            status = %response.status,
                            "Retryable status on final attempt, returning response"
                        );
                        return Ok(response);
                    }

                    let delay = match response.retry_after() {
                        Some(server_delay) => server_delay,
                        None => self.jitter_delay(&mut delays, attempt),
                    };
                    tracing::warn!(
                        repository = %self.repository,
                        request_id = %request.request_id,
                        attempt = attempt + 1,
                        max_attempts,
                        status = %response.status,
                        delay = ?delay,
                        server_directed = response.retry_after().is_some(),
                        "Retryable status returned, retrying"
                    );
                    metrics::record_retry("status");
                    self.wait(delay).await?;
                }
                Err(e) if e.is_transient() => {
                    tracing::warn!(
                        repository = %self.repository,
                        request_id = %request.request_id,
                        attempt = attempt + 1,
                        max_attempts,
                        error = %e,
                        "Transient request failure"
                    );
                    if is_last {
                        return Err(e);
                    }
                    let delay = self.jitter_delay(&mut delays, attempt);
                    metrics::record_retry("transport");
                    self.wait(delay).await?;
                }
                Err(e) => return Err(e),
            }

            attempt += 1;
        }
    }
}
