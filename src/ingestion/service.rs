//! Ingestion service: validation and dispatch to the per-type extractors.

use crate::{
    config::Config,
    ingestion::{
        pdf::extract_pdf_text,
        types::{ExtractionError, UploadedFile},
    },
};
use std::path::PathBuf;

/// Document kinds the service knows how to read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentKind {
    /// `.txt`, decoded as UTF-8.
    PlainText,
    /// `.pdf`, extracted page by page.
    Pdf,
}

/// Converts uploaded files into plain text.
///
/// Holds only immutable limits, so one instance is shared by every request.
#[derive(Debug, Clone)]
pub struct IngestionService {
    max_upload_bytes: usize,
    pdf_enabled: bool,
    scratch_dir: Option<PathBuf>,
}

impl IngestionService {
    /// Build a service with explicit limits.
    pub fn new(max_upload_bytes: usize, pdf_enabled: bool) -> Self {
        Self {
            max_upload_bytes,
            pdf_enabled,
            scratch_dir: None,
        }
    }

    /// Build a service from runtime configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_upload_bytes, config.pdf_extraction_enabled)
            .with_scratch_dir(config.upload_scratch_dir.clone())
    }

    /// Stage transient PDF files in `dir` instead of the OS temp dir.
    pub fn with_scratch_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.scratch_dir = dir;
        self
    }

    /// Largest accepted upload, in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Validate an upload and return its text.
    ///
    /// Checks run in a fixed order: presence, size, then extension. Nothing is parsed until
    /// all three pass.
    pub async fn extract_text(&self, file: Option<UploadedFile>) -> Result<String, ExtractionError> {
        let file = file.ok_or(ExtractionError::Missing)?;
        let kind = self.classify(&file)?;
        let UploadedFile { name, bytes } = file;
        let size = bytes.len();

        let text = match kind {
            DocumentKind::PlainText => String::from_utf8_lossy(&bytes).into_owned(),
            DocumentKind::Pdf => extract_pdf_text(bytes, self.scratch_dir.clone()).await?,
        };

        tracing::info!(
            file = %name,
            kind = ?kind,
            bytes = size,
            chars = text.chars().count(),
            "Extracted upload text"
        );
        Ok(text)
    }

    /// Apply the size and type checks, returning the kind to extract as.
    pub fn classify(&self, file: &UploadedFile) -> Result<DocumentKind, ExtractionError> {
        if file.size() > self.max_upload_bytes {
            return Err(ExtractionError::TooLarge {
                size: file.size(),
                limit: self.max_upload_bytes,
            });
        }

        let extension = file.extension();
        match extension.as_deref() {
            Some("txt") => Ok(DocumentKind::PlainText),
            Some("pdf") if self.pdf_enabled => Ok(DocumentKind::Pdf),
            _ => Err(ExtractionError::UnsupportedType {
                extension,
                pdf_enabled: self.pdf_enabled,
            }),
        }
    }
}
