//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, ZakupError};

/// Main configuration for the zakup pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ZakupConfig {
    /// Pipeline orchestration configuration.
    pub pipeline: PipelineConfig,

    /// Structuring service configuration.
    pub structuring: StructuringConfig,
}

impl ZakupConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        serde_json::from_str(&data).map_err(|e| ZakupError::Config(e.to_string()))
    }
}

/// Pipeline orchestration configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Minimum normalized text length (characters) required to attempt
    /// extraction; shorter documents short-circuit to a low-confidence
    /// terminal result.
    pub min_text_chars: usize,

    /// Maximum length (characters) of the extracted text kept on the
    /// result for audit/manual review.
    pub audit_text_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_text_chars: 50,
            audit_text_chars: 2000,
        }
    }
}

/// Structuring service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuringConfig {
    /// Base URL of the Ollama-compatible endpoint.
    pub base_url: String,

    /// Model name used for schema extraction.
    pub model: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Sampling temperature. Near-zero so repeated calls on identical
    /// input are maximally consistent.
    pub temperature: f32,
}

impl Default for StructuringConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "qwen2.5:7b".to_string(),
            timeout_secs: 60,
            temperature: 0.05,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pipeline_thresholds() {
        let config = PipelineConfig::default();
        assert_eq!(config.min_text_chars, 50);
        assert_eq!(config.audit_text_chars, 2000);
    }

    #[test]
    fn config_roundtrips_through_json() {
        let config = ZakupConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ZakupConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.structuring.base_url, config.structuring.base_url);
        assert_eq!(parsed.pipeline.min_text_chars, config.pipeline.min_text_chars);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let parsed: ZakupConfig =
            serde_json::from_str(r#"{"structuring": {"model": "llama3.1:8b"}}"#).unwrap();
        assert_eq!(parsed.structuring.model, "llama3.1:8b");
        assert_eq!(parsed.structuring.timeout_secs, 60);
        assert_eq!(parsed.pipeline.min_text_chars, 50);
    }
}
