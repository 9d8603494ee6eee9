//! Structuring service integration.
//!
//! The service is a remote schema-extraction call (a language-model API).
//! Only the [`StructuringService`] contract and its failure semantics
//! matter to the pipeline: any error or timeout triggers the deterministic
//! fallback extractor.

mod client;
mod parser;
mod prompt;

pub use client::{DisabledStructuring, MockTransport, OllamaTransport, StructuringClient};
pub use prompt::{OFFER_SYSTEM_PROMPT, build_offer_prompt};

use crate::error::StructuringError;
use crate::models::offer::StructuredOffer;

/// Pipeline-facing structuring contract, injected into the pipeline
/// constructor so tests can substitute doubles and no global client state
/// exists.
pub trait StructuringService: Send + Sync {
    /// Structure normalized document text into an offer.
    fn structure(
        &self,
        text: &str,
        file_name: &str,
    ) -> Result<StructuredOffer, StructuringError>;
}

/// LLM transport abstraction (allows mocking the remote call).
pub trait LlmTransport: Send + Sync {
    /// Run one generation request and return the raw model output.
    fn generate(&self, prompt: &str, system: &str) -> Result<String, StructuringError>;
}
