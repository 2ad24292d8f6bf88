use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use super::types::{
    Content, GenerateContentBody, GenerateContentResponse, GenerationConfig, GoogleSearch, Tool,
};
use super::{DEFAULT_API_URL, GenerateContent, GenerateRequest, Generated, MODEL_NAME};
use crate::http::{HttpClient, classify_quota};

/// REST client for `generateContent`.
///
/// Authentication is carried by the wrapped reqwest client's default headers.
pub struct GeminiClient {
    http: HttpClient,
    pub api_url: String,
    pub model: String,
}

impl GeminiClient {
    #[tracing::instrument(skip(client, api_url))]
    pub fn new(client: Client, api_url: Option<String>, model: Option<String>) -> Self {
        let api_url = api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let model = model.unwrap_or_else(|| MODEL_NAME.to_string());
        Self {
            http: HttpClient::new(client),
            api_url: api_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_url, model)
    }

    fn body(request: &GenerateRequest) -> GenerateContentBody {
        let generation_config =
            if request.temperature.is_some() || request.response_mime_type.is_some() {
                Some(GenerationConfig {
                    temperature: request.temperature,
                    response_mime_type: request.response_mime_type.clone(),
                })
            } else {
                None
            };

        let tools = if request.google_search {
            vec![Tool {
                google_search: Some(GoogleSearch {}),
            }]
        } else {
            Vec::new()
        };

        GenerateContentBody {
            contents: vec![Content::user(request.contents.as_str())],
            system_instruction: Some(Content::system(request.system_instruction.as_str())),
            generation_config,
            tools,
        }
    }
}

#[async_trait]
impl GenerateContent for GeminiClient {
    #[tracing::instrument(skip(self, request))]
    async fn generate(&self, request: &GenerateRequest) -> Result<Generated> {
        let model = request.model.as_deref().unwrap_or(&self.model);
        let url = self.endpoint(model);
        debug!(
            "Calling {} (temperature={:?}, mime={:?}, search={})",
            model, request.temperature, request.response_mime_type, request.google_search
        );

        let response: GenerateContentResponse = self
            .http
            .post_json(&url, &Self::body(request))
            .await
            .map_err(|e| classify_quota(e, model))?;

        let generated = Generated {
            text: response.text(),
            sources: response.sources(),
        };
        debug!(
            "Model {} returned {} chars, {} sources",
            model,
            generated.text.len(),
            generated.sources.len()
        );
        Ok(generated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::MODEL_NAME_FAST;
    use crate::http::{ApiError, SERVICE_UNAVAILABLE_MESSAGE, ServiceUnavailable};
    use mockito::Matcher;
    use serde_json::json;

    fn ok_body(text: &str) -> String {
        json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": text}]},
                "finishReason": "STOP"
            }]
        })
        .to_string()
    }

    #[test]
    fn test_new_defaults() {
        let gemini = GeminiClient::new(Client::new(), None, None);
        assert_eq!(gemini.api_url, DEFAULT_API_URL);
        assert_eq!(gemini.model, MODEL_NAME);
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let gemini = GeminiClient::new(Client::new(), Some("http://localhost:1234/".into()), None);
        assert_eq!(
            gemini.endpoint("m"),
            "http://localhost:1234/v1beta/models/m:generateContent"
        );
    }

    #[tokio::test]
    async fn test_generate_sends_config_and_search_tool() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("POST", "/v1beta/models/gemini-3-pro-preview:generateContent")
            .match_body(Matcher::PartialJson(json!({
                "contents": [{"role": "user", "parts": [{"text": "Compose a waltz"}]}],
                "systemInstruction": {"parts": [{"text": "be a composer"}]},
                "generationConfig": {"temperature": 0.7},
                "tools": [{"googleSearch": {}}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "candidates": [{
                        "content": {"parts": [{"text": "X:1\nK:C"}]},
                        "groundingMetadata": {
                            "groundingChunks": [{"web": {"uri": "https://src.example"}}]
                        }
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let gemini = GeminiClient::new(Client::new(), Some(url), None);
        let request = GenerateRequest::new("be a composer", "Compose a waltz")
            .temperature(0.7)
            .with_search();
        let generated = gemini.generate(&request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(generated.text, "X:1\nK:C");
        assert_eq!(generated.sources, vec!["https://src.example".to_string()]);
    }

    #[tokio::test]
    async fn test_generate_json_mime_and_model_override() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("POST", "/v1beta/models/gemini-3-flash-preview:generateContent")
            .match_body(Matcher::PartialJson(json!({
                "generationConfig": {"responseMimeType": "application/json"}
            })))
            .with_status(200)
            .with_body(ok_body("{}"))
            .create_async()
            .await;

        let gemini = GeminiClient::new(Client::new(), Some(url), None);
        let mut request = GenerateRequest::new("analyze", "X:1").json();
        request.model = Some(MODEL_NAME_FAST.to_string());
        let generated = gemini.generate(&request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(generated.text, "{}");
    }

    #[tokio::test]
    async fn test_generate_quota_error_rewritten() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("POST", "/v1beta/models/gemini-3-pro-preview:generateContent")
            .with_status(429)
            .with_body(
                r#"{"error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}}"#,
            )
            .create_async()
            .await;

        let gemini = GeminiClient::new(Client::new(), Some(url), None);
        let err = gemini
            .generate(&GenerateRequest::new("s", "c"))
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert!(err.downcast_ref::<ServiceUnavailable>().is_some());
        assert_eq!(err.to_string(), SERVICE_UNAVAILABLE_MESSAGE);
    }

    #[tokio::test]
    async fn test_generate_server_error_kept_typed() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("POST", "/v1beta/models/gemini-3-pro-preview:generateContent")
            .with_status(500)
            .with_body(r#"{"error": {"code": 500, "message": "Internal error", "status": "INTERNAL"}}"#)
            .create_async()
            .await;

        let gemini = GeminiClient::new(Client::new(), Some(url), None);
        let err = gemini
            .generate(&GenerateRequest::new("s", "c"))
            .await
            .unwrap_err();

        mock.assert_async().await;
        let api = err.downcast_ref::<ApiError>().unwrap();
        assert_eq!(api.code(), 500);
        assert!(crate::http::is_retryable(&err));
    }
}
