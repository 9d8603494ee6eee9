//! Data models for offers and pipeline configuration.

pub mod config;
pub mod offer;

pub use config::{PipelineConfig, StructuringConfig, ZakupConfig};
pub use offer::{
    Currency, ExtractionMethod, ExtractionResult, LineItem, StructuredOffer, Unit,
};
