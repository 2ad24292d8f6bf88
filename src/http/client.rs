//! JSON-over-HTTP client that turns failures into typed errors.

use anyhow::{Context, Result};
use log::debug;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::{ApiError, TransportError};

/// Error envelope returned by Google APIs.
#[derive(Deserialize, Debug)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize, Debug)]
struct ErrorBody {
    code: Option<u16>,
    #[serde(default)]
    message: String,
    status: Option<String>,
}

/// Thin wrapper around a configured reqwest [`Client`].
///
/// Retrying is left to the caller; see [`super::with_retry`].
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// POSTs `body` as JSON and deserializes the JSON response.
    ///
    /// A response without a success status becomes an [`ApiError`]; a request
    /// that never got a response becomes a [`TransportError`].
    #[tracing::instrument(skip(self, body))]
    pub async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("POST JSON to {}...", url);

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError {
                message: e.to_string(),
            })?;

        let response = check_status(response).await?;

        response
            .json::<T>()
            .await
            .context("Failed to parse JSON response")
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let http_status = status.as_u16();
    let text = response.text().await.unwrap_or_default();
    debug!("HTTP {} error body: {}", http_status, text);

    let err = match serde_json::from_str::<ErrorEnvelope>(&text) {
        Ok(envelope) => ApiError {
            http_status,
            code: envelope.error.code,
            status: envelope.error.status,
            message: envelope.error.message,
        },
        Err(_) => ApiError {
            http_status,
            code: None,
            status: None,
            message: if text.trim().is_empty() {
                status.canonical_reason().unwrap_or("Unknown error").to_string()
            } else {
                text
            },
        },
    };

    Err(err.into())
}
