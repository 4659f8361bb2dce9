//! Command-line client for a running Textbrief server.
//!
//! Uploads a file for extraction when `--file` is given, then sends the text (or `--text`, or
//! stdin) to the summarize endpoint and prints the result.
use std::{
    io::Read,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use reqwest::{
    Client,
    multipart::{Form, Part},
};
use serde::Deserialize;
use serde_json::json;

#[derive(Parser)]
#[command(
    name = "textbrief-cli",
    about = "Extract and summarize documents through a Textbrief server"
)]
struct Cli {
    /// Base URL of the server.
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    server: String,
    /// `.txt` or `.pdf` file to upload.
    #[arg(long, conflicts_with = "text")]
    file: Option<PathBuf>,
    /// Text to summarize directly.
    #[arg(long)]
    text: Option<String>,
    /// Summary length: short, medium, or detailed.
    #[arg(long, default_value = "medium")]
    length: String,
    /// Output language code (e.g. `fr`).
    #[arg(long, default_value = "en")]
    language: String,
    /// Print the extracted text and stop.
    #[arg(long, requires = "file")]
    extract_only: bool,
}

#[derive(Deserialize)]
struct UploadResponse {
    text: String,
}

#[derive(Deserialize)]
struct SummarizeResponse {
    summary: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let http = Client::builder()
        .user_agent("textbrief-cli")
        .build()
        .context("failed to build HTTP client")?;
    let server = cli.server.trim_end_matches('/');

    let text = match (&cli.file, cli.text) {
        (Some(path), _) => upload(&http, server, path).await?,
        (None, Some(text)) => text,
        (None, None) => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read text from stdin")?;
            buffer
        }
    };

    if cli.extract_only {
        println!("{text}");
        return Ok(());
    }

    let summary = summarize(&http, server, &text, &cli.length, &cli.language).await?;
    println!("{summary}");
    Ok(())
}

async fn upload(http: &Client, server: &str, path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("{} has no usable file name", path.display()))?
        .to_string();

    let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));
    let response = http
        .post(format!("{server}/api/upload"))
        .multipart(form)
        .send()
        .await
        .context("upload request failed")?;

    let body: UploadResponse = decode(response).await?;
    Ok(body.text)
}

async fn summarize(
    http: &Client,
    server: &str,
    text: &str,
    length: &str,
    language: &str,
) -> Result<String> {
    let response = http
        .post(format!("{server}/api/summarize"))
        .json(&json!({
            "text": text,
            "summaryLength": length,
            "outputLanguage": language,
        }))
        .send()
        .await
        .context("summarize request failed")?;

    let body: SummarizeResponse = decode(response).await?;
    Ok(body.summary)
}

async fn decode<T: for<'de> Deserialize<'de>>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .context("failed to read response body")?;

    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorResponse>(&bytes)
            .map(|body| body.error)
            .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
        bail!("server returned {status}: {message}");
    }

    serde_json::from_slice(&bytes).context("failed to decode server response")
}
