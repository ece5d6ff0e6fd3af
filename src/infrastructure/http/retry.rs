//! Retry policy with exponential backoff.
//!
//! Only responses whose status is in the policy's retry set are retried
//! (rate limiting, HTTP 429, by default). Every other status, 404 included,
//! is returned to the caller on the first attempt. Callers observe either the
//! final response or `RetriesExhausted`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use tracing::{debug, warn};

use super::transport::{ApiRequest, ApiResponse, Transport};
use crate::config::RetrySettings;
use crate::shared::error::ClientError;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub backoff_factor: Duration,
    /// Growth factor applied per further retry
    pub backoff_multiplier: f64,
    pub max_backoff: Duration,
    pub retry_statuses: Vec<StatusCode>,
    /// Prefer a numeric `Retry-After` header over the computed delay
    pub respect_retry_after: bool,
    /// ±30% random jitter on computed delays
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 10,
            backoff_factor: Duration::from_millis(100),
            backoff_multiplier: 2.0,
            max_backoff: Duration::from_secs(120),
            retry_statuses: vec![StatusCode::TOO_MANY_REQUESTS],
            respect_retry_after: true,
            jitter: false,
        }
    }
}

impl RetryPolicy {
    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            backoff_factor: Duration::from_millis(settings.backoff_factor_ms),
            backoff_multiplier: settings.backoff_multiplier,
            max_backoff: Duration::from_millis(settings.max_backoff_ms),
            retry_statuses: settings
                .retry_statuses
                .iter()
                .filter_map(|code| StatusCode::from_u16(*code).ok())
                .collect(),
            respect_retry_after: settings.respect_retry_after,
            jitter: settings.jitter,
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn should_retry(&self, status: StatusCode) -> bool {
        self.retry_statuses.contains(&status)
    }

    /// Computed delay before retry number `retry` (1-based), without jitter.
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1) as i32;
        let millis = self.backoff_factor.as_millis() as f64 * self.backoff_multiplier.powi(exponent);
        let capped = millis.min(self.max_backoff.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }

    /// Delay before retry number `retry`, honoring `Retry-After` if allowed.
    pub fn delay_for(&self, retry: u32, headers: &HeaderMap) -> Duration {
        if self.respect_retry_after {
            if let Some(after) = parse_retry_after(headers) {
                return after.min(self.max_backoff);
            }
        }

        let base = self.backoff_for(retry);
        if self.jitter {
            let factor = 1.0 + rand::rng().random_range(-0.3..0.3);
            Duration::from_millis((base.as_millis() as f64 * factor) as u64)
        } else {
            base
        }
    }
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Anything carrying a status and headers can be retried on.
pub trait RetryableResponse {
    fn status(&self) -> StatusCode;
    fn headers(&self) -> &HeaderMap;
}

impl RetryableResponse for ApiResponse {
    fn status(&self) -> StatusCode {
        self.status
    }

    fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

impl RetryableResponse for reqwest::Response {
    fn status(&self) -> StatusCode {
        reqwest::Response::status(self)
    }

    fn headers(&self) -> &HeaderMap {
        reqwest::Response::headers(self)
    }
}

/// Run `attempt` until it yields a non-retryable status or the budget runs out.
///
/// Errors from `attempt` itself (connection failures, timeouts) are returned
/// immediately.
pub async fn with_retry<F, Fut, R>(policy: &RetryPolicy, mut attempt: F) -> Result<R, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<R, ClientError>>,
    R: RetryableResponse,
{
    let mut retries = 0u32;

    loop {
        let response = attempt().await?;
        let status = response.status();

        if !policy.should_retry(status) {
            if retries > 0 {
                debug!(retries, status = %status, "Call succeeded after retries");
            }
            return Ok(response);
        }

        if retries >= policy.max_retries {
            warn!(
                attempts = retries + 1,
                status = %status,
                "Retry budget exhausted"
            );
            return Err(ClientError::RetriesExhausted {
                attempts: retries + 1,
                status,
            });
        }

        retries += 1;
        let delay = policy.delay_for(retries, response.headers());

        warn!(
            retry = retries,
            max_retries = policy.max_retries,
            status = %status,
            delay_ms = delay.as_millis() as u64,
            "Retryable status, backing off"
        );

        tokio::time::sleep(delay).await;
    }
}

/// Wraps a transport so that every call goes through a [`RetryPolicy`].
pub struct RetryingTransport {
    inner: Arc<dyn Transport>,
    policy: RetryPolicy,
}

impl RetryingTransport {
    pub fn new(inner: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl Transport for RetryingTransport {
    async fn call(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        with_retry(&self.policy, || self.inner.call(request)).await
    }
}
