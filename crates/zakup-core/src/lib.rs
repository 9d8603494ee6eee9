//! Core library for commercial offer extraction.
//!
//! This crate provides:
//! - Document decoding (PDF with positional reconstruction, DOCX)
//! - Text normalization with a short-text short-circuit
//! - Structuring service client (remote schema extraction)
//! - Deterministic regex/heuristic fallback extractor
//! - Confidence scoring and manual-review classification

pub mod classify;
pub mod decode;
pub mod error;
pub mod models;
pub mod normalize;
pub mod offer;
pub mod pipeline;
pub mod structuring;

pub use decode::DocumentFormat;
pub use error::{DecodeError, Result, StructuringError, ZakupError};
pub use models::config::{PipelineConfig, StructuringConfig, ZakupConfig};
pub use models::offer::{
    Currency, ExtractionMethod, ExtractionResult, LineItem, StructuredOffer, Unit,
};
pub use offer::{FallbackExtraction, FallbackExtractor};
pub use pipeline::OfferPipeline;
pub use structuring::{
    DisabledStructuring, LlmTransport, OllamaTransport, StructuringClient, StructuringService,
};
