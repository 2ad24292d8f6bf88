//! HTTP client, typed API errors and retry logic.

mod client;
mod error;
mod retry;

pub use client::HttpClient;
pub use error::{ApiError, SERVICE_UNAVAILABLE_MESSAGE, ServiceUnavailable, TransportError};
pub use retry::{
    MAX_RETRIES, RETRY_BASE_DELAY_MS, RetryPolicy, classify_quota, is_quota_error, is_retryable,
    with_retry,
};
