//! Text-generation providers behind a single-prompt interface.
//!
//! Both adapters issue one non-streaming HTTP request per call and surface the first candidate,
//! if any. Selection happens once at startup in [`build_generation_client`].

use crate::config::{Config, SummarizationProvider};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

const USER_AGENT: &str = "textbrief/summary";

/// Errors surfaced while calling a text-generation provider.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Provider could not be reached or the client could not be built.
    #[error("Generation provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider answered with an error status.
    #[error("Failed to generate text: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Single-turn prompt passed to a provider.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Model identifier understood by the provider.
    pub model: String,
    /// Complete instruction text.
    pub prompt: String,
}

/// Interface implemented by text-generation providers.
#[async_trait]
pub trait TextGenerationClient: Send + Sync {
    /// Send one prompt and return the first candidate's text, or `None` when the provider
    /// produced no candidate.
    async fn generate(&self, request: GenerationRequest)
    -> Result<Option<String>, GenerationError>;
}

/// Build the provider client selected by configuration.
pub fn build_generation_client(
    config: &Config,
) -> Result<Arc<dyn TextGenerationClient>, GenerationError> {
    let http = Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|error| {
            GenerationError::ProviderUnavailable(format!("failed to build HTTP client: {error}"))
        })?;

    let client: Arc<dyn TextGenerationClient> = match config.summarization_provider {
        SummarizationProvider::OpenAI => Arc::new(OpenAiClient {
            http,
            base_url: config.openai_base_url.clone(),
            api_key: config.openai_api_key.clone().unwrap_or_default(),
        }),
        SummarizationProvider::Ollama => Arc::new(OllamaClient {
            http,
            base_url: config.ollama_url.clone(),
        }),
    };
    Ok(client)
}

/// Client for OpenAI-compatible chat completion APIs.
pub struct OpenAiClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[async_trait]
impl TextGenerationClient for OpenAiClient {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<Option<String>, GenerationError> {
        let payload = json!({
            "model": request.model,
            "messages": [{ "role": "user", "content": request.prompt }],
        });
        let call = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&payload);

        let body: ChatCompletionResponse = send_json(call, "OpenAI", &self.endpoint()).await?;
        Ok(body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content))
    }
}

/// Client for a local Ollama runtime.
pub struct OllamaClient {
    http: Client,
    base_url: String,
}

impl OllamaClient {
    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
}

#[async_trait]
impl TextGenerationClient for OllamaClient {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<Option<String>, GenerationError> {
        let call = self.http.post(self.endpoint()).json(&json!({
            "model": request.model,
            "prompt": request.prompt,
            "stream": false,
        }));

        let body: OllamaResponse = send_json(call, "Ollama", &self.endpoint()).await?;
        if !body.done {
            return Err(GenerationError::InvalidResponse(
                "Ollama stopped before finishing the generation".into(),
            ));
        }
        Ok(Some(body.response).filter(|text| !text.is_empty()))
    }
}

/// Send a prepared provider call and decode its JSON body.
///
/// Connection failures and 404s mean the provider (or its endpoint) is not there; any other
/// non-success status is a failed generation and keeps the status and body in the message.
async fn send_json<T: DeserializeOwned>(
    call: RequestBuilder,
    provider: &str,
    endpoint: &str,
) -> Result<T, GenerationError> {
    let response = call.send().await.map_err(|error| {
        GenerationError::ProviderUnavailable(format!(
            "failed to reach {provider} at {endpoint}: {error}"
        ))
    })?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(GenerationError::ProviderUnavailable(format!(
            "{provider} endpoint {endpoint} returned 404"
        )));
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(GenerationError::GenerationFailed(format!(
            "{provider} returned {status}: {body}"
        )));
    }

    response.json().await.map_err(|error| {
        GenerationError::InvalidResponse(format!("failed to decode {provider} response: {error}"))
    })
}
