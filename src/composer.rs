//! Composition operations: each builds a request, calls the model and cleans
//! up what comes back.

use anyhow::Result;
use log::{debug, error, info, warn};
use std::fmt;

use crate::abc;
use crate::datasets;
use crate::gemini::{GenerateContent, GenerateRequest, Generated};
use crate::http::{RetryPolicy, with_retry};
use crate::model::{AnalysisData, WorkflowStage};
use crate::prompts;

const GENERATION_TEMPERATURE: f64 = 0.7;
const WORKFLOW_TEMPERATURE: f64 = 0.5;

/// The model's analysis could not be read as [`AnalysisData`].
#[derive(Debug)]
pub struct AnalysisParseError {
    pub detail: String,
}

impl fmt::Display for AnalysisParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Analysis failed to produce valid JSON.")
    }
}

impl std::error::Error for AnalysisParseError {}

pub struct Composer<G: GenerateContent> {
    gemini: G,
    composer: String,
    retry: RetryPolicy,
}

impl<G: GenerateContent> Composer<G> {
    pub fn new(gemini: G) -> Self {
        Self {
            gemini,
            composer: prompts::DEFAULT_COMPOSER.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    /// Name written into the `C:` header of workflow scores.
    pub fn with_composer(mut self, composer: impl Into<String>) -> Self {
        self.composer = composer.into();
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn composer(&self) -> &str {
        &self.composer
    }

    /// Composes a new piece from a free-text prompt, grounded with web search.
    #[tracing::instrument(skip(self))]
    pub async fn generate_composition(&self, prompt: &str) -> Result<Generated> {
        let datasets = datasets::describe(prompt);
        debug!("Contextual datasets: {}", datasets);

        let request = GenerateRequest::new(
            prompts::generation(&self.composer),
            prompts::generation_prompt(prompt, &datasets),
        )
        .temperature(GENERATION_TEMPERATURE)
        .with_search();

        let generated = self.gemini.generate(&request).await?;
        info!(
            "Generated composition ({} chars, {} sources)",
            generated.text.len(),
            generated.sources.len()
        );
        Ok(Generated {
            text: abc::clean_output(&generated.text),
            sources: generated.sources,
        })
    }

    /// Asks the model for a structured analysis of `abc`.
    ///
    /// Out-of-range scores are logged, not rejected.
    #[tracing::instrument(skip(self, abc))]
    pub async fn analyze_composition(&self, abc: &str) -> Result<AnalysisData> {
        let request = GenerateRequest::new(prompts::ANALYSIS, prompts::analysis_prompt(abc)).json();
        let generated = self.gemini.generate(&request).await?;

        let body = abc::unfence(&generated.text);
        let body = if body.is_empty() { "{}" } else { body.as_str() };
        let analysis: AnalysisData = serde_json::from_str(body).map_err(|e| {
            error!("Failed to parse analysis JSON: {}", e);
            AnalysisParseError {
                detail: e.to_string(),
            }
        })?;

        for warning in analysis.warnings() {
            warn!("Analysis value out of range: {}", warning);
        }
        Ok(analysis)
    }

    /// Applies a free-text instruction to the score.
    #[tracing::instrument(skip(self, abc, original_prompt))]
    pub async fn enhance_composition(
        &self,
        abc: &str,
        instruction: &str,
        original_prompt: &str,
    ) -> Result<String> {
        let request = GenerateRequest::new(
            prompts::enhancement(),
            prompts::enhancement_prompt(original_prompt, instruction, abc),
        );
        let generated = self.gemini.generate(&request).await?;
        Ok(abc::clean_output(&generated.text))
    }

    #[tracing::instrument(skip(self, abc, original_prompt))]
    pub async fn add_instruments(
        &self,
        abc: &str,
        instruments: &str,
        original_prompt: &str,
    ) -> Result<String> {
        let request = GenerateRequest::new(
            prompts::orchestration(),
            prompts::orchestration_prompt(original_prompt, instruments, abc),
        );
        let generated = self.gemini.generate(&request).await?;
        Ok(abc::clean_output(&generated.text))
    }

    #[tracing::instrument(skip(self, abc))]
    pub async fn convert_to_music_xml(&self, abc: &str) -> Result<String> {
        let request = GenerateRequest::new(prompts::MUSIC_XML, abc);
        let generated = self.gemini.generate(&request).await?;
        Ok(abc::unfence(&generated.text))
    }

    /// Markdown musicology commentary, returned as written by the model.
    #[tracing::instrument(skip(self, abc))]
    pub async fn generate_report(&self, abc: &str, title: &str) -> Result<String> {
        let request = GenerateRequest::new(prompts::REPORT, prompts::report_prompt(title, abc));
        let generated = self.gemini.generate(&request).await?;
        Ok(generated.text)
    }

    /// Runs one workflow stage over the current score.
    ///
    /// Transient failures are retried with backoff. The result is cleaned,
    /// its `%%score` groups bracketed, the composer credited and the title
    /// tagged with the stage.
    #[tracing::instrument(skip(self, abc, prompt))]
    pub async fn execute_workflow_stage(
        &self,
        stage: WorkflowStage,
        abc: &str,
        prompt: &str,
    ) -> Result<String> {
        let datasets = datasets::describe(prompt);
        let request = GenerateRequest::new(
            prompts::workflow_stage(stage, prompt, &datasets, &self.composer),
            prompts::workflow_stage_prompt(stage, prompt, abc),
        )
        .temperature(WORKFLOW_TEMPERATURE);

        let gemini = &self.gemini;
        let request = &request;
        let generated = with_retry(
            &format!("Workflow stage {}", stage),
            &self.retry,
            || gemini.generate(request),
        )
        .await?;

        let text = abc::clean_output(&generated.text);
        let text = abc::normalize_score_directive(&text);
        let text = abc::ensure_composer(&text, &self.composer);
        let text = abc::apply_stage_label(&text, &stage.title_label());
        info!("Completed stage {} ({} chars)", stage, text.len());
        Ok(text)
    }
}
