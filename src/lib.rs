#![deny(missing_docs)]

//! Core library for the Textbrief summarization server.

/// HTTP routing and request handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Error classification shared by the services.
pub mod error;
/// Upload validation and text extraction.
pub mod ingestion;
/// Structured logging and tracing setup.
pub mod logging;
/// Summary generation through external providers.
pub mod summarization;
