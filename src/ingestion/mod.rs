//! File ingestion: upload validation and text extraction for `.txt` and `.pdf` files.

mod pdf;
mod service;
pub mod types;
pub mod upload;

pub use service::{DocumentKind, IngestionService};
pub use types::{ExtractionError, UploadedFile};
pub use upload::read_upload;
