//! Summarization through an external text-generation provider.
//!
//! The service validates input, builds a deterministic instruction from the text and the
//! caller's options, and delegates a single request to the provider client chosen at startup.

pub mod client;
pub mod language;
pub mod prompt;
mod service;

pub use client::{
    GenerationError, GenerationRequest, TextGenerationClient, build_generation_client,
};
pub use prompt::{LengthTier, build_instruction};
pub use service::{NO_SUMMARY_FALLBACK, SummarizationError, SummarizationService, SummaryOptions};
