//! Access to the hosted Gemini generative model.

use anyhow::Result;
use async_trait::async_trait;

mod client;
pub mod types;

pub use client::GeminiClient;

/// Default model for every call.
pub const MODEL_NAME: &str = "gemini-3-pro-preview";

/// Lower-latency model, selectable with `--model`.
pub const MODEL_NAME_FAST: &str = "gemini-3-flash-preview";

pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com";

/// One generation call: a system instruction, one user turn and optional
/// generation settings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenerateRequest {
    /// Overrides the client's model for this call.
    pub model: Option<String>,
    pub system_instruction: String,
    pub contents: String,
    pub temperature: Option<f64>,
    pub response_mime_type: Option<String>,
    /// Enables the Google Search grounding tool.
    pub google_search: bool,
}

impl GenerateRequest {
    pub fn new(system_instruction: impl Into<String>, contents: impl Into<String>) -> Self {
        GenerateRequest {
            system_instruction: system_instruction.into(),
            contents: contents.into(),
            ..Default::default()
        }
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn json(mut self) -> Self {
        self.response_mime_type = Some("application/json".to_string());
        self
    }

    pub fn with_search(mut self) -> Self {
        self.google_search = true;
        self
    }
}

/// Text returned by the model together with the web pages that grounded it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Generated {
    pub text: String,
    pub sources: Vec<String>,
}

impl Generated {
    pub fn text(text: impl Into<String>) -> Self {
        Generated {
            text: text.into(),
            sources: Vec::new(),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerateContent: Send + Sync {
    /// Runs one request. Quota failures surface as
    /// [`crate::http::ServiceUnavailable`].
    async fn generate(&self, request: &GenerateRequest) -> Result<Generated>;
}
