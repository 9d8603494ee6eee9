//! Pipeline orchestrator.
//!
//! One invocation walks `DECODING → NORMALIZED → (SHORT_TEXT_TERMINAL |
//! STRUCTURING → (STRUCTURED | FALLBACK))` and classifies the terminal
//! state. The pipeline holds no state across invocations and is safe to
//! call concurrently for independent documents.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::classify;
use crate::decode::{self, DocumentFormat};
use crate::error::Result;
use crate::models::config::PipelineConfig;
use crate::models::offer::{ExtractionMethod, ExtractionResult, StructuredOffer};
use crate::normalize::normalize;
use crate::offer::{FallbackExtraction, FallbackExtractor};
use crate::structuring::StructuringService;

/// Explanatory audit text for documents whose extractable text is too
/// short to ever yield a usable structure.
const SHORT_TEXT_NOTE: &str = "Текст не извлечён: документ содержит слишком мало текста \
                               (вероятно, скан без текстового слоя или повреждённый файл)";

const SHORT_TEXT_CONFIDENCE: u8 = 20;

/// Terminal extraction states. The variant carries each state's
/// invariants: a fallback result always forces manual review.
enum Outcome {
    Structured(StructuredOffer),
    Fallback(FallbackExtraction),
}

/// Commercial offer extraction pipeline.
pub struct OfferPipeline {
    structuring: Arc<dyn StructuringService>,
    config: PipelineConfig,
}

impl OfferPipeline {
    /// Create a pipeline with default configuration.
    pub fn new(structuring: Arc<dyn StructuringService>) -> Self {
        Self::with_config(structuring, PipelineConfig::default())
    }

    /// Create a pipeline with explicit configuration.
    pub fn with_config(structuring: Arc<dyn StructuringService>, config: PipelineConfig) -> Self {
        Self { structuring, config }
    }

    /// Extract a structured offer from a supplier document.
    ///
    /// The only propagated errors are an unsupported/undecodable document;
    /// every other outcome is a successful [`ExtractionResult`], possibly
    /// low-confidence and flagged for manual review.
    pub fn extract(
        &self,
        content: &[u8],
        file_name: &str,
        format: DocumentFormat,
    ) -> Result<ExtractionResult> {
        let start = Instant::now();
        debug!("decoding {} ({} bytes, {:?})", file_name, content.len(), format);

        let raw = decode::decode(content, format)?;
        let text = normalize(&raw);
        let text_chars = text.chars().count();

        // Too sparse to ever structure: do not spend an external call.
        if text_chars < self.config.min_text_chars {
            info!(
                "{}: extracted text too short ({} chars), skipping extraction",
                file_name, text_chars
            );
            return Ok(ExtractionResult {
                offer: StructuredOffer::default(),
                confidence: SHORT_TEXT_CONFIDENCE,
                needs_manual_review: true,
                extracted_text: SHORT_TEXT_NOTE.to_string(),
                source_file_name: file_name.to_string(),
                method: ExtractionMethod::ShortText,
                warnings: Vec::new(),
                processing_time_ms: start.elapsed().as_millis() as u64,
            });
        }

        let mut warnings = Vec::new();
        let outcome = match self.structuring.structure(&text, file_name) {
            Ok(offer) => Outcome::Structured(offer),
            Err(e) => {
                warn!("{}: structuring failed ({}), using fallback extractor", file_name, e);
                warnings.push(format!("structuring service failed: {}", e));
                Outcome::Fallback(FallbackExtractor::new().extract(&text))
            }
        };

        let (offer, baseline, forced_review, method) = match outcome {
            Outcome::Structured(offer) => {
                let baseline = classify::structured_baseline(&offer);
                (offer, baseline, false, ExtractionMethod::Structured)
            }
            Outcome::Fallback(fallback) => (
                fallback.offer,
                fallback.confidence,
                true,
                ExtractionMethod::Fallback,
            ),
        };

        let confidence = classify::adjusted_confidence(baseline, &offer);
        let needs_manual_review = classify::requires_review(confidence, &offer, forced_review);

        debug!(
            "{}: {:?} extraction, confidence {}, review={}",
            file_name, method, confidence, needs_manual_review
        );

        Ok(ExtractionResult {
            offer,
            confidence,
            needs_manual_review,
            extracted_text: truncate_chars(&text, self.config.audit_text_chars),
            source_file_name: file_name.to_string(),
            method,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::build_docx;
    use crate::error::{StructuringError, ZakupError};
    use crate::models::offer::Currency;
    use crate::structuring::{DisabledStructuring, MockTransport, StructuringClient};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Service double that must never be reached.
    struct CountingService {
        calls: AtomicUsize,
    }

    impl CountingService {
        fn new() -> Self {
            Self { calls: AtomicUsize::new(0) }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl StructuringService for CountingService {
        fn structure(&self, _: &str, _: &str) -> std::result::Result<StructuredOffer, StructuringError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(StructuredOffer::default())
        }
    }

    #[test]
    fn short_text_short_circuits_without_calling_the_service() {
        let service = Arc::new(CountingService::new());
        let pipeline = OfferPipeline::new(service.clone());

        let bytes = build_docx(&["Привет"]);
        let result = pipeline.extract(&bytes, "short.docx", DocumentFormat::Docx).unwrap();

        assert_eq!(result.confidence, 20);
        assert!(result.needs_manual_review);
        assert!(result.offer.positions.is_empty());
        assert_eq!(result.method, ExtractionMethod::ShortText);
        assert!(result.extracted_text.contains("мало текста"));
        assert_eq!(service.calls(), 0);
    }

    #[test]
    fn malformed_service_response_falls_back_with_forced_review() {
        let service = Arc::new(StructuringClient::new(MockTransport::replying(
            "извините, вот просто текст вместо JSON",
        )));
        let pipeline = OfferPipeline::new(service);

        let bytes = build_docx(&[
            "Коммерческое предложение от ТОО Ромашка на поставку расходных материалов",
            "ИТОГО: 150000 KZT",
        ]);
        let result = pipeline.extract(&bytes, "offer.docx", DocumentFormat::Docx).unwrap();

        assert_eq!(result.method, ExtractionMethod::Fallback);
        assert!(result.needs_manual_review);
        assert_eq!(result.offer.total_price, Some(Decimal::from(150000)));
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn structured_offer_with_total_and_positions_is_trusted() {
        let service = Arc::new(StructuringClient::new(MockTransport::replying(
            r#"{
                "totalPrice": 300000,
                "currency": "KZT",
                "company": "ТОО Ромашка",
                "positions": [
                    {"name": "Болт М10", "quantity": 100, "totalPrice": 100000},
                    {"name": "Гайка М10", "quantity": 100, "totalPrice": 100000},
                    {"name": "Шайба М10", "quantity": 100, "totalPrice": 100000}
                ]
            }"#,
        )));
        let pipeline = OfferPipeline::new(service);

        let bytes = build_docx(&[
            "Коммерческое предложение на поставку крепежа, всего три позиции, подробности ниже",
        ]);
        let result = pipeline.extract(&bytes, "offer.docx", DocumentFormat::Docx).unwrap();

        assert_eq!(result.method, ExtractionMethod::Structured);
        assert!(result.confidence >= 95);
        assert!(!result.needs_manual_review);
        assert_eq!(result.offer.positions.len(), 3);
    }

    #[test]
    fn fallback_path_extracts_offer_fields_end_to_end() {
        let pipeline = OfferPipeline::new(Arc::new(DisabledStructuring));

        let bytes = build_docx(&[
            "ТОО Ромашка ИТОГО: 150000 KZT Доставка: 7 дней",
            "Дополнительно: цены указаны с учётом НДС",
        ]);
        let result = pipeline.extract(&bytes, "offer.docx", DocumentFormat::Docx).unwrap();

        assert_eq!(result.method, ExtractionMethod::Fallback);
        assert!(result.needs_manual_review);
        assert_eq!(result.offer.company.as_deref(), Some("ТОО Ромашка"));
        assert_eq!(result.offer.total_price, Some(Decimal::from(150000)));
        assert_eq!(result.offer.currency, Currency::Kzt);
        assert!(result.offer.delivery_term.as_deref().unwrap().contains("7 дней"));
        assert_eq!(result.confidence, 50);
    }

    #[test]
    fn dirty_service_positions_never_reach_the_caller() {
        let service = Arc::new(StructuringClient::new(MockTransport::replying(
            r#"{
                "totalPrice": 50000,
                "positions": [
                    {"name": "", "quantity": 5},
                    {"name": "Кабель", "quantity": -2},
                    {"name": "Розетка", "quantity": 10, "unit": "коробка"}
                ]
            }"#,
        )));
        let pipeline = OfferPipeline::new(service);

        let bytes = build_docx(&[
            "Коммерческое предложение на поставку электротоваров в ассортименте по прайсу",
        ]);
        let result = pipeline.extract(&bytes, "offer.docx", DocumentFormat::Docx).unwrap();

        assert_eq!(result.offer.positions.len(), 2);
        for position in &result.offer.positions {
            assert!(!position.name.is_empty());
            assert!(position.quantity > Decimal::ZERO);
        }
        assert!(result.confidence <= 100);
    }

    #[test]
    fn audit_text_is_truncated_to_the_configured_limit() {
        let service = Arc::new(CountingService::new());
        let pipeline = OfferPipeline::new(service);

        let long_line = "слово ".repeat(600);
        let bytes = build_docx(&[long_line.trim()]);
        let result = pipeline.extract(&bytes, "long.docx", DocumentFormat::Docx).unwrap();

        assert_eq!(result.extracted_text.chars().count(), 2000);
    }

    #[test]
    fn undecodable_document_is_a_typed_error() {
        let pipeline = OfferPipeline::new(Arc::new(DisabledStructuring));
        let err = pipeline.extract(b"not a zip", "broken.docx", DocumentFormat::Docx).unwrap_err();
        assert!(matches!(err, ZakupError::Decode(_)));
    }

    #[test]
    fn truncate_chars_is_char_boundary_safe() {
        assert_eq!(truncate_chars("привет", 3), "при");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
