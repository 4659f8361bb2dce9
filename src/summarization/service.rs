//! Summarization service: input validation, instruction assembly, and provider delegation.

use crate::{
    error::ErrorClass,
    summarization::{
        client::{GenerationError, GenerationRequest, TextGenerationClient},
        prompt::{LengthTier, build_instruction},
    },
};
use std::sync::Arc;
use thiserror::Error;

/// Returned when the provider produced no usable candidate.
pub const NO_SUMMARY_FALLBACK: &str = "No summary generated.";

/// Errors emitted by the summarization service.
#[derive(Debug, Error)]
pub enum SummarizationError {
    /// Text was empty or whitespace only.
    #[error("Please provide text to summarize")]
    EmptyInput,
    /// Request body could not be decoded.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
    /// Provider call failed; never retried.
    #[error("Summarization provider failed: {0}")]
    ProviderFailure(#[from] GenerationError),
}

impl SummarizationError {
    /// Classify the error for reporting.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::ProviderFailure(_) => ErrorClass::Processing,
            _ => ErrorClass::Input,
        }
    }

    /// Message safe to return to the client.
    pub fn public_message(&self) -> String {
        match self {
            Self::ProviderFailure(_) => "Failed to summarize text".to_string(),
            other => other.to_string(),
        }
    }
}

/// Caller-selected summary options.
#[derive(Debug, Clone, Default)]
pub struct SummaryOptions {
    /// Target verbosity.
    pub length: LengthTier,
    /// Requested output language code; `None` or `"en"` keeps the model's default.
    pub output_language: Option<String>,
}

/// Produces summaries through an injected text-generation client.
pub struct SummarizationService {
    client: Arc<dyn TextGenerationClient>,
    model: String,
}

impl SummarizationService {
    /// Wrap a provider client and the model name sent with every request.
    pub fn new(client: Arc<dyn TextGenerationClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Summarize `text` in a single provider call.
    pub async fn summarize(
        &self,
        text: &str,
        options: &SummaryOptions,
    ) -> Result<String, SummarizationError> {
        if text.trim().is_empty() {
            return Err(SummarizationError::EmptyInput);
        }

        let prompt = build_instruction(text, options.length, options.output_language.as_deref());
        tracing::info!(
            model = %self.model,
            length = options.length.as_str(),
            language = options.output_language.as_deref().unwrap_or("en"),
            input_chars = text.chars().count(),
            "Requesting summary"
        );

        let candidate = self
            .client
            .generate(GenerationRequest {
                model: self.model.clone(),
                prompt,
            })
            .await?;

        let summary = candidate
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());
        match summary {
            Some(summary) => {
                tracing::info!(summary_chars = summary.chars().count(), "Summary generated");
                Ok(summary)
            }
            None => {
                tracing::warn!("Provider returned no candidates; using fallback summary");
                Ok(NO_SUMMARY_FALLBACK.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    enum Reply {
        Text(&'static str),
        Nothing,
        Fail,
    }

    struct StubClient {
        reply: Reply,
        prompts: Mutex<Vec<GenerationRequest>>,
    }

    impl StubClient {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextGenerationClient for StubClient {
        async fn generate(
            &self,
            request: GenerationRequest,
        ) -> Result<Option<String>, GenerationError> {
            self.prompts.lock().await.push(request);
            match self.reply {
                Reply::Text(text) => Ok(Some(text.to_string())),
                Reply::Nothing => Ok(None),
                Reply::Fail => Err(GenerationError::GenerationFailed("429 rate limited".into())),
            }
        }
    }

    fn options(length: LengthTier, language: Option<&str>) -> SummaryOptions {
        SummaryOptions {
            length,
            output_language: language.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn empty_and_whitespace_input_are_rejected_without_calling_provider() {
        let client = StubClient::new(Reply::Text("unused"));
        let service = SummarizationService::new(client.clone(), "gpt-4o");

        for text in ["", "   ", "\n\t "] {
            let error = service
                .summarize(text, &SummaryOptions::default())
                .await
                .expect_err("empty input");
            assert!(matches!(error, SummarizationError::EmptyInput));
            assert_eq!(error.class(), ErrorClass::Input);
        }
        assert!(client.prompts.lock().await.is_empty());
    }

    #[tokio::test]
    async fn forwards_composed_instruction_and_model() {
        let client = StubClient::new(Reply::Text("  A fox jumped.  "));
        let service = SummarizationService::new(client.clone(), "gpt-4o");

        let summary = service
            .summarize(
                "The quick brown fox...",
                &options(LengthTier::Short, Some("en")),
            )
            .await
            .expect("summary");

        assert_eq!(summary, "A fox jumped.");
        let prompts = client.prompts.lock().await;
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].model, "gpt-4o");
        assert!(prompts[0].prompt.contains("The quick brown fox..."));
        assert!(
            prompts[0]
                .prompt
                .contains("very concise summary in 1-2 short paragraphs")
        );
        assert!(!prompts[0].prompt.contains("Translate"));
    }

    #[tokio::test]
    async fn french_output_names_the_language() {
        let client = StubClient::new(Reply::Text("Un renard."));
        let service = SummarizationService::new(client.clone(), "gpt-4o");

        service
            .summarize("A fox.", &options(LengthTier::Medium, Some("fr")))
            .await
            .expect("summary");

        let prompts = client.prompts.lock().await;
        assert!(prompts[0].prompt.contains("Translate the summary to French."));
    }

    #[tokio::test]
    async fn missing_candidates_use_fallback() {
        for reply in [Reply::Nothing, Reply::Text("   ")] {
            let service = SummarizationService::new(StubClient::new(reply), "gpt-4o");
            let summary = service
                .summarize("Some text", &SummaryOptions::default())
                .await
                .expect("fallback");
            assert_eq!(summary, "No summary generated.");
        }
    }

    #[tokio::test]
    async fn provider_errors_surface_as_processing_failures() {
        let client = StubClient::new(Reply::Fail);
        let service = SummarizationService::new(client.clone(), "gpt-4o");

        let error = service
            .summarize("Some text", &SummaryOptions::default())
            .await
            .expect_err("provider failure");

        assert!(matches!(error, SummarizationError::ProviderFailure(_)));
        assert_eq!(error.class(), ErrorClass::Processing);
        assert_eq!(error.public_message(), "Failed to summarize text");
        assert_eq!(client.prompts.lock().await.len(), 1, "no retry");
    }
}
