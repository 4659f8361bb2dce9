//! Multipart form reading for the upload endpoint.

use crate::ingestion::types::{ExtractionError, UploadedFile};
use axum::extract::Multipart;

/// Name of the multipart field carrying the upload.
pub const FILE_FIELD: &str = "file";

/// Read the `file` field of a multipart form, stopping as soon as it grows past `max_bytes`.
///
/// Returns `Ok(None)` when the form has no file field, or when the field is the empty part a
/// browser submits with no file selected. Other fields are skipped.
pub async fn read_upload(
    mut multipart: Multipart,
    max_bytes: usize,
) -> Result<Option<UploadedFile>, ExtractionError> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|error| ExtractionError::InvalidForm(error.to_string()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let name = field.file_name().unwrap_or_default().to_string();
        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|error| ExtractionError::InvalidForm(error.to_string()))?
        {
            let size = bytes.len() + chunk.len();
            if size > max_bytes {
                return Err(ExtractionError::TooLarge {
                    size,
                    limit: max_bytes,
                });
            }
            bytes.extend_from_slice(&chunk);
        }

        if name.is_empty() && bytes.is_empty() {
            return Ok(None);
        }
        return Ok(Some(UploadedFile::new(name, bytes)));
    }

    Ok(None)
}
