//! Retry with exponential backoff, and classification of API failures.

use anyhow::Result;
use log::{debug, error, warn};
use std::future::Future;
use std::time::Duration;

use super::error::{ApiError, ServiceUnavailable, TransportError};

/// Retries after the first attempt.
pub const MAX_RETRIES: u32 = 3;

/// Delay before the first retry in milliseconds. Doubles on every retry.
pub const RETRY_BASE_DELAY_MS: u64 = 2000;

/// Transport failure signatures reported by HTTP stacks in error messages.
const TRANSIENT_MESSAGES: &[&str] = &["xhr error", "fetch failed", "Rpc failed"];

/// Status sentinel for failures the API could not categorize.
const UNKNOWN_STATUS: &str = "UNKNOWN";

const QUOTA_STATUS: &str = "RESOURCE_EXHAUSTED";
const QUOTA_MESSAGES: &[&str] = &["429", "quota", QUOTA_STATUS];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; the operation runs at most `retries + 1` times.
    pub retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: MAX_RETRIES,
            base_delay: Duration::from_millis(RETRY_BASE_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(retries: u32, base_delay: Duration) -> Self {
        Self { retries, base_delay }
    }

    /// Wait before retry number `attempt + 1`: `base_delay * 2^attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

/// True for transient failures: HTTP 500, known transport errors, or the
/// `UNKNOWN` status. Quota errors are never retryable.
pub fn is_retryable(e: &anyhow::Error) -> bool {
    if e.downcast_ref::<ServiceUnavailable>().is_some() {
        return false;
    }

    if e.downcast_ref::<TransportError>().is_some() {
        return true;
    }

    if let Some(api) = e.downcast_ref::<ApiError>() {
        if api.http_status == 500 || api.code() == 500 || api.has_status(UNKNOWN_STATUS) {
            return true;
        }
    }

    e.chain().any(|cause| {
        let message = cause.to_string();
        TRANSIENT_MESSAGES.iter().any(|m| message.contains(m))
    })
}

/// True for quota and rate-limit failures: HTTP 429, `RESOURCE_EXHAUSTED`, or
/// a message mentioning either or the word "quota".
pub fn is_quota_error(e: &anyhow::Error) -> bool {
    if e.downcast_ref::<ServiceUnavailable>().is_some() {
        return true;
    }

    if let Some(api) = e.downcast_ref::<ApiError>() {
        if api.http_status == 429 || api.code() == 429 || api.has_status(QUOTA_STATUS) {
            return true;
        }
    }

    e.chain().any(|cause| {
        let message = cause.to_string();
        QUOTA_MESSAGES.iter().any(|m| message.contains(m))
    })
}

/// Rewrites quota failures into [`ServiceUnavailable`]; other errors pass through.
pub fn classify_quota(e: anyhow::Error, model: &str) -> anyhow::Error {
    if e.downcast_ref::<ServiceUnavailable>().is_some() {
        return e;
    }
    if is_quota_error(&e) {
        error!("Model {} quota/rate limit hit: {}", model, e);
        return anyhow::Error::from(ServiceUnavailable);
    }
    e
}

/// Runs `operation`, retrying transient failures with exponential backoff.
///
/// Non-retryable errors return immediately. When retries run out, the last
/// error is returned unchanged.
pub async fn with_retry<F, Fut, T>(
    operation_name: &str,
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if !is_retryable(&e) {
                    debug!("{}: non-retryable error: {}", operation_name, e);
                    return Err(e);
                }

                if attempt >= policy.retries {
                    warn!(
                        "{}: giving up after {} attempts: {}",
                        operation_name,
                        attempt + 1,
                        e
                    );
                    return Err(e);
                }

                let delay = policy.delay_for(attempt);
                warn!(
                    "{}: attempt {}/{} failed ({}), retrying in {}ms...",
                    operation_name,
                    attempt + 1,
                    policy.retries + 1,
                    e,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
