//! HTTP surface for Textbrief.
//!
//! - `POST /api/upload` – Multipart form with one `file` field (`.txt` or `.pdf`). Returns
//!   `{ "text": string }`.
//! - `POST /api/summarize` – JSON `{ "text", "summaryLength"?, "outputLanguage"? }`. Returns
//!   `{ "summary": string }`.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools/hosts.
//!
//! Every failure is answered with `{ "error": string }`: 400 for input the caller can fix,
//! 500 for parse and provider failures.

use crate::{
    config::Config,
    error::ErrorClass,
    ingestion::{ExtractionError, IngestionService, read_upload},
    summarization::{
        GenerationError, LengthTier, SummarizationError, SummarizationService, SummaryOptions,
        build_generation_client,
    },
};
use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, State, multipart::MultipartRejection,
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Services shared by every request. Both are immutable after startup.
#[derive(Clone)]
pub struct AppState {
    /// Upload-to-text conversion.
    pub ingestion: Arc<IngestionService>,
    /// Text-to-summary conversion.
    pub summarization: Arc<SummarizationService>,
}

impl AppState {
    /// Wire both services from configuration, building the provider client once.
    pub fn from_config(config: &Config) -> Result<Self, GenerationError> {
        let client = build_generation_client(config)?;
        Ok(Self {
            ingestion: Arc::new(IngestionService::from_config(config)),
            summarization: Arc::new(SummarizationService::new(
                client,
                config.summarization_model.clone(),
            )),
        })
    }
}

/// Build the HTTP router exposing the upload and summarize endpoints.
pub fn create_router(state: AppState) -> Router {
    // Extracted text can be as large as an upload; leave headroom for JSON escaping.
    let summarize_limit = state.ingestion.max_upload_bytes().saturating_mul(2);

    Router::new()
        .route(
            "/api/upload",
            post(upload_file).layer(DefaultBodyLimit::disable()),
        )
        .route(
            "/api/summarize",
            post(summarize_text).layer(DefaultBodyLimit::max(summarize_limit)),
        )
        .route("/commands", get(get_commands))
        .with_state(state)
}

/// Success response for `POST /api/upload`.
#[derive(Serialize)]
struct UploadResponse {
    text: String,
}

/// Extract text from an uploaded file.
///
/// The upload handler enforces the size limit itself while streaming the field, so oversize
/// files get the same JSON error as every other rejection.
#[tracing::instrument(name = "upload", skip_all, fields(request_id = %Uuid::new_v4()))]
async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let multipart =
        multipart.map_err(|rejection| ExtractionError::InvalidForm(rejection.body_text()));
    extract_upload(&state, multipart)
        .await
        .map(|text| Json(UploadResponse { text }))
        .inspect_err(AppError::log)
}

async fn extract_upload(
    state: &AppState,
    multipart: Result<Multipart, ExtractionError>,
) -> Result<String, AppError> {
    let file = read_upload(multipart?, state.ingestion.max_upload_bytes()).await?;
    Ok(state.ingestion.extract_text(file).await?)
}

/// Request body for `POST /api/summarize`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummarizeRequest {
    /// Text to summarize.
    #[serde(default)]
    text: Option<String>,
    /// `short` | `medium` | `detailed`; anything else means `medium`.
    #[serde(default)]
    summary_length: Option<String>,
    /// ISO language code of the summary (defaults to `en`, no translation).
    #[serde(default)]
    output_language: Option<String>,
}

/// Success response for `POST /api/summarize`.
#[derive(Serialize)]
struct SummarizeResponse {
    summary: String,
}

/// Summarize text with the configured provider.
#[tracing::instrument(name = "summarize", skip_all, fields(request_id = %Uuid::new_v4()))]
async fn summarize_text(
    State(state): State<AppState>,
    request: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<Json<SummarizeResponse>, AppError> {
    let result = match request {
        Ok(Json(request)) => {
            let options = SummaryOptions {
                length: LengthTier::from_label(request.summary_length.as_deref()),
                output_language: request.output_language,
            };
            let text = request.text.unwrap_or_default();
            state
                .summarization
                .summarize(&text, &options)
                .await
                .map_err(AppError::from)
        }
        Err(rejection) => Err(SummarizationError::InvalidBody(rejection.body_text()).into()),
    };

    result
        .map(|summary| Json(SummarizeResponse { summary }))
        .inspect_err(AppError::log)
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "upload",
                method: "POST",
                path: "/api/upload",
                description: "Extract plain text from a multipart `file` field (.txt or .pdf). Response returns { \"text\": string }.",
                request_example: None,
            },
            CommandDescriptor {
                name: "summarize",
                method: "POST",
                path: "/api/summarize",
                description: "Summarize text with the configured language model. Response returns { \"summary\": string }.",
                request_example: Some(json!({
                    "text": "Long document contents",
                    "summaryLength": "short",
                    "outputLanguage": "fr"
                })),
            },
        ],
    })
}

/// Failure of either service, rendered as `{ "error": message }`.
#[derive(Debug)]
pub enum AppError {
    /// Upload could not be turned into text.
    Extraction(ExtractionError),
    /// Text could not be summarized.
    Summarization(SummarizationError),
}

impl AppError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::Extraction(error) => error.class(),
            Self::Summarization(error) => error.class(),
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Extraction(error) => error.public_message(),
            Self::Summarization(error) => error.public_message(),
        }
    }

    fn detail(&self) -> String {
        match self {
            Self::Extraction(error) => error.to_string(),
            Self::Summarization(error) => error.to_string(),
        }
    }

    /// Record the failure before it is reported to the caller.
    fn log(&self) {
        match self.class() {
            ErrorClass::Input => tracing::warn!(error = %self.detail(), "Rejected request"),
            ErrorClass::Processing => tracing::error!(error = %self.detail(), "Request failed"),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.class().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            Json(ErrorBody {
                error: self.public_message(),
            }),
        )
            .into_response()
    }
}

impl From<ExtractionError> for AppError {
    fn from(inner: ExtractionError) -> Self {
        Self::Extraction(inner)
    }
}

impl From<SummarizationError> for AppError {
    fn from(inner: SummarizationError) -> Self {
        Self::Summarization(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::{AppState, create_router, get_commands};
    use crate::ingestion::IngestionService;
    use crate::summarization::{
        GenerationError, GenerationRequest, SummarizationService, TextGenerationClient,
    };
    use async_trait::async_trait;
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode},
    };
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    const BOUNDARY: &str = "textbrief-test-boundary";

    #[tokio::test]
    async fn commands_catalog_exposes_both_endpoints() {
        let response = get_commands().await;
        let commands = response.0.commands;

        let upload = commands
            .iter()
            .find(|cmd| cmd.name == "upload")
            .expect("upload command present");
        assert_eq!(upload.method, "POST");
        assert_eq!(upload.path, "/api/upload");

        let summarize = commands
            .iter()
            .find(|cmd| cmd.name == "summarize")
            .expect("summarize command present");
        assert_eq!(summarize.path, "/api/summarize");
        assert!(summarize.request_example.is_some());
    }

    #[tokio::test]
    async fn upload_returns_plain_text() {
        let (app, _) = test_app(Reply::Text("unused"));

        let response = app
            .oneshot(upload_request("hello.txt", b"Hello world."))
            .await
            .expect("router response");

        let (status, body) = read_json(response).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "text": "Hello world." }));
    }

    #[tokio::test]
    async fn oversize_upload_is_rejected_with_400() {
        let (app, _) = test_app(Reply::Text("unused"));
        let payload = vec![b'a'; 11 * 1024 * 1024];

        let response = app
            .oneshot(upload_request("big.txt", &payload))
            .await
            .expect("router response");

        let (status, body) = read_json(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "File size exceeds 10MB limit");
    }

    #[tokio::test]
    async fn docx_upload_is_rejected_with_dedicated_message() {
        let (app, _) = test_app(Reply::Text("unused"));

        let response = app
            .oneshot(upload_request("report.docx", b"PK\x03\x04"))
            .await
            .expect("router response");

        let (status, body) = read_json(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "DOCX processing is not supported");
    }

    #[tokio::test]
    async fn form_without_file_field_is_missing() {
        let (app, _) = test_app(Reply::Text("unused"));
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhi\r\n--{BOUNDARY}--\r\n"
        );

        let response = app
            .oneshot(multipart_request(body.into_bytes()))
            .await
            .expect("router response");

        let (status, body) = read_json(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No file provided");
    }

    #[tokio::test]
    async fn empty_file_part_is_missing() {
        let (app, _) = test_app(Reply::Text("unused"));

        let response = app
            .oneshot(upload_request("", b""))
            .await
            .expect("router response");

        let (status, body) = read_json(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "No file provided" }));
    }

    #[tokio::test]
    async fn non_multipart_upload_is_a_json_error() {
        let (app, _) = test_app(Reply::Text("unused"));

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/upload")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .expect("request"),
            )
            .await
            .expect("router response");

        let (status, body) = read_json(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(
            body["error"]
                .as_str()
                .expect("error string")
                .starts_with("Invalid upload")
        );
    }

    #[tokio::test]
    async fn summarize_returns_provider_text() {
        let (app, client) = test_app(Reply::Text("A fox jumped."));

        let response = app
            .oneshot(summarize_request(json!({
                "text": "The quick brown fox...",
                "summaryLength": "short",
                "outputLanguage": "fr"
            })))
            .await
            .expect("router response");

        let (status, body) = read_json(response).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "summary": "A fox jumped." }));

        let prompts = client.prompts.lock().await;
        assert_eq!(prompts.len(), 1);
        assert!(
            prompts[0]
                .prompt
                .contains("very concise summary in 1-2 short paragraphs")
        );
        assert!(prompts[0].prompt.contains("Translate the summary to French."));
    }

    #[tokio::test]
    async fn summarize_without_candidates_returns_fallback() {
        let (app, _) = test_app(Reply::Nothing);

        let response = app
            .oneshot(summarize_request(json!({ "text": "Some text" })))
            .await
            .expect("router response");

        let (status, body) = read_json(response).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"], "No summary generated.");
    }

    #[tokio::test]
    async fn blank_or_missing_text_is_rejected() {
        for payload in [json!({ "text": "   " }), json!({ "summaryLength": "short" })] {
            let (app, client) = test_app(Reply::Text("unused"));

            let response = app
                .oneshot(summarize_request(payload))
                .await
                .expect("router response");

            let (status, body) = read_json(response).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "Please provide text to summarize");
            assert!(client.prompts.lock().await.is_empty());
        }
    }

    #[tokio::test]
    async fn malformed_json_is_a_json_error() {
        let (app, _) = test_app(Reply::Text("unused"));

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/summarize")
                    .header("content-type", "application/json")
                    .body(Body::from("{ not json"))
                    .expect("request"),
            )
            .await
            .expect("router response");

        let (status, body) = read_json(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(
            body["error"]
                .as_str()
                .expect("error string")
                .starts_with("Invalid request body")
        );
    }

    #[tokio::test]
    async fn provider_failure_maps_to_500() {
        let (app, _) = test_app(Reply::Fail);

        let response = app
            .oneshot(summarize_request(json!({ "text": "Some text" })))
            .await
            .expect("router response");

        let (status, body) = read_json(response).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Failed to summarize text" }));
    }

    enum Reply {
        Text(&'static str),
        Nothing,
        Fail,
    }

    struct StubClient {
        reply: Reply,
        prompts: Mutex<Vec<GenerationRequest>>,
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
                Reply::Fail => Err(GenerationError::ProviderUnavailable(
                    "connection refused".into(),
                )),
            }
        }
    }

    fn test_app(reply: Reply) -> (Router, Arc<StubClient>) {
        let client = Arc::new(StubClient {
            reply,
            prompts: Mutex::new(Vec::new()),
        });
        let state = AppState {
            ingestion: Arc::new(IngestionService::new(10 * 1024 * 1024, true)),
            summarization: Arc::new(SummarizationService::new(client.clone(), "test-model")),
        };
        (create_router(state), client)
    }

    fn multipart_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/upload")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request")
    }

    fn upload_request(file_name: &str, content: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        multipart_request(body)
    }

    fn summarize_request(payload: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/summarize")
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request")
    }

    async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = serde_json::from_slice(&body).expect("json body");
        (status, json)
    }
}
