//! Upload value types and the ingestion error definitions.

use crate::error::ErrorClass;
use thiserror::Error;

const MIB: usize = 1024 * 1024;

/// A file received in a single upload request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// File name as declared by the client.
    pub name: String,
    /// Raw payload.
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Wrap a declared file name and its payload.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Payload size in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Lower-cased trailing dot-segment of the file name, if the name has one.
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit_once('.')
            .map(|(_, extension)| extension.trim().to_lowercase())
            .filter(|extension| !extension.is_empty())
    }
}

/// Errors produced while turning an upload into text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The request carried no file.
    #[error("No file provided")]
    Missing,
    /// The payload is larger than the configured limit.
    #[error("File size exceeds {} limit", describe_limit(.limit))]
    TooLarge {
        /// Bytes seen before the upload was rejected.
        size: usize,
        /// Configured limit in bytes.
        limit: usize,
    },
    /// The file extension is outside the supported set.
    #[error("{}", unsupported_message(.extension, .pdf_enabled))]
    UnsupportedType {
        /// Extension derived from the file name.
        extension: Option<String>,
        /// Whether PDF was part of the supported set at the time.
        pdf_enabled: bool,
    },
    /// The multipart body could not be read.
    #[error("Invalid upload: {0}")]
    InvalidForm(String),
    /// The document could not be parsed.
    #[error("Failed to parse document: {0}")]
    ParseFailure(String),
}

impl ExtractionError {
    /// Classify the error for reporting.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::ParseFailure(_) => ErrorClass::Processing,
            _ => ErrorClass::Input,
        }
    }

    /// Message safe to return to the client.
    pub fn public_message(&self) -> String {
        match self {
            Self::ParseFailure(_) => "Failed to process file".to_string(),
            other => other.to_string(),
        }
    }
}

fn describe_limit(limit: &usize) -> String {
    let limit = *limit;
    if limit >= MIB && limit % MIB == 0 {
        format!("{}MB", limit / MIB)
    } else {
        format!("{limit} byte")
    }
}

fn unsupported_message(extension: &Option<String>, pdf_enabled: &bool) -> String {
    match extension.as_deref() {
        Some("docx") => "DOCX processing is not supported".to_string(),
        _ if *pdf_enabled => "Unsupported file type. Please upload a PDF or TXT file.".to_string(),
        _ => "Unsupported file type. Please upload a TXT file.".to_string(),
    }
}
