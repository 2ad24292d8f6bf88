//! Error types raised by the HTTP layer.

use std::fmt;

/// Message shown for every quota or rate-limit failure.
pub const SERVICE_UNAVAILABLE_MESSAGE: &str =
    "Gemini service is currently unavailable due to quota limits. Please try again later.";

/// Error status returned by the API, e.g. `{"error": {"code": 500, "status": "INTERNAL"}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// HTTP status of the response.
    pub http_status: u16,
    /// `error.code` from the body, when present.
    pub code: Option<u16>,
    /// `error.status` from the body, e.g. `RESOURCE_EXHAUSTED`.
    pub status: Option<String>,
    pub message: String,
}

impl ApiError {
    /// The most specific numeric code available.
    pub fn code(&self) -> u16 {
        self.code.unwrap_or(self.http_status)
    }

    pub fn has_status(&self, status: &str) -> bool {
        self.status.as_deref() == Some(status)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            Some(status) => write!(f, "API error {} ({}): {}", self.code(), status, self.message),
            None => write!(f, "API error {}: {}", self.code(), self.message),
        }
    }
}

impl std::error::Error for ApiError {}

/// The request never produced a response: connect, timeout or body errors.
#[derive(Debug)]
pub struct TransportError {
    pub message: String,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Transport error: {}", self.message)
    }
}

impl std::error::Error for TransportError {}

/// Quota or rate limit hit. Always carries [`SERVICE_UNAVAILABLE_MESSAGE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceUnavailable;

impl fmt::Display for ServiceUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(SERVICE_UNAVAILABLE_MESSAGE)
    }
}

impl std::error::Error for ServiceUnavailable {}
