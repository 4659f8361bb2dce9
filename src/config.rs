use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Default ingestion size limit (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
const DEFAULT_OLLAMA_MODEL: &str = "llama3.1";

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the Textbrief server.
///
/// Built once in `main` and handed to the services that need it; nothing on the request path
/// reads the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Text-generation backend used for summaries.
    pub summarization_provider: SummarizationProvider,
    /// Model identifier passed to the provider.
    pub summarization_model: String,
    /// Bearer credential for the OpenAI API.
    pub openai_api_key: Option<String>,
    /// Root of the OpenAI-compatible API.
    pub openai_base_url: String,
    /// Root of the Ollama runtime.
    pub ollama_url: String,
    /// Largest accepted upload, in bytes.
    pub max_upload_bytes: usize,
    /// Whether `.pdf` uploads are accepted.
    pub pdf_extraction_enabled: bool,
    /// Directory for transient PDF files; the OS temp dir when unset.
    pub upload_scratch_dir: Option<PathBuf>,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

/// Supported text-generation backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SummarizationProvider {
    /// Hosted OpenAI chat completions API.
    OpenAI,
    /// Local Ollama runtime.
    Ollama,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let summarization_provider = match optional("SUMMARIZATION_PROVIDER") {
            Some(value) => value.parse().map_err(|()| {
                ConfigError::InvalidValue("SUMMARIZATION_PROVIDER".to_string())
            })?,
            None => SummarizationProvider::OpenAI,
        };

        let openai_api_key = optional("OPENAI_API_KEY");
        if summarization_provider == SummarizationProvider::OpenAI && openai_api_key.is_none() {
            return Err(ConfigError::MissingVariable("OPENAI_API_KEY".to_string()));
        }

        let summarization_model = optional("SUMMARIZATION_MODEL").unwrap_or_else(|| {
            match summarization_provider {
                SummarizationProvider::OpenAI => DEFAULT_OPENAI_MODEL,
                SummarizationProvider::Ollama => DEFAULT_OLLAMA_MODEL,
            }
            .to_string()
        });

        Ok(Self {
            summarization_provider,
            summarization_model,
            openai_api_key,
            openai_base_url: optional("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            ollama_url: optional("OLLAMA_URL").unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            max_upload_bytes: optional("MAX_UPLOAD_BYTES")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("MAX_UPLOAD_BYTES".to_string()))
                })
                .transpose()?
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            pdf_extraction_enabled: optional("PDF_EXTRACTION_ENABLED")
                .map(|value| {
                    parse_flag(&value).ok_or_else(|| {
                        ConfigError::InvalidValue("PDF_EXTRACTION_ENABLED".to_string())
                    })
                })
                .transpose()?
                .unwrap_or(true),
            upload_scratch_dir: optional("UPLOAD_SCRATCH_DIR").map(PathBuf::from),
            server_port: optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl std::str::FromStr for SummarizationProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            _ => Err(()),
        }
    }
}

/// Read `.env` (when present) and load configuration from the environment.
pub fn load_config() -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    tracing::debug!(
        provider = ?config.summarization_provider,
        model = %config.summarization_model,
        max_upload_bytes = config.max_upload_bytes,
        pdf_extraction_enabled = config.pdf_extraction_enabled,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    Ok(config)
}
