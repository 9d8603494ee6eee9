//! Deterministic fallback extractor.
//!
//! Used whenever the structuring service is unavailable or returns invalid
//! data. Purely regex/heuristic, never calls out, never fails: it always
//! returns some offer, even an empty one. Results from this path are never
//! trusted as fully reliable — the pipeline forces manual review on them.

use rust_decimal::Decimal;
use tracing::debug;

use super::rules::{
    extract_company, extract_currency, extract_delivery_term, extract_line_items,
    extract_payment_term, extract_total_price, extract_valid_until,
};
use crate::models::offer::StructuredOffer;

/// Confidence when no signal was found.
const CONFIDENCE_EMPTY: u8 = 30;
/// Confidence when one of total price / line items was found.
const CONFIDENCE_PARTIAL: u8 = 50;
/// Confidence when both a total price and at least one item were found.
const CONFIDENCE_FULL: u8 = 70;

/// Offer produced by the fallback path, with its baseline confidence.
#[derive(Debug, Clone)]
pub struct FallbackExtraction {
    /// Extracted offer, possibly empty.
    pub offer: StructuredOffer,
    /// Baseline confidence for the classifier.
    pub confidence: u8,
}

/// Tiered regex/heuristic extractor over normalized text.
#[derive(Debug, Default)]
pub struct FallbackExtractor;

impl FallbackExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract an offer from text. All heuristics fire independently;
    /// later ones never suppress earlier matches.
    pub fn extract(&self, text: &str) -> FallbackExtraction {
        let total_price = extract_total_price(text);
        let currency = extract_currency(text).unwrap_or_default();
        let company = extract_company(text);
        let delivery_term = extract_delivery_term(text);
        let payment_term = extract_payment_term(text);
        let valid_until = extract_valid_until(text);
        let positions = extract_line_items(text);

        // Baseline is decided on what was actually found, before the total
        // is back-filled from item sums.
        let confidence = match (total_price.is_some(), !positions.is_empty()) {
            (true, true) => CONFIDENCE_FULL,
            (false, false) => CONFIDENCE_EMPTY,
            _ => CONFIDENCE_PARTIAL,
        };

        let total_price = total_price.or_else(|| {
            let sum: Decimal = positions.iter().filter_map(|p| p.total_price).sum();
            if sum > Decimal::ZERO { Some(sum) } else { None }
        });

        debug!(
            "fallback extraction: total={:?}, items={}, confidence={}",
            total_price,
            positions.len(),
            confidence
        );

        FallbackExtraction {
            offer: StructuredOffer {
                total_price,
                currency,
                company,
                delivery_term,
                payment_term,
                valid_until,
                positions,
            },
            confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::offer::Currency;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn extracts_company_total_currency_and_delivery() {
        let result = FallbackExtractor::new()
            .extract("ТОО Ромашка ИТОГО: 150000 KZT Доставка: 7 дней");

        assert_eq!(result.offer.company.as_deref(), Some("ТОО Ромашка"));
        assert_eq!(result.offer.total_price, Some(dec("150000")));
        assert_eq!(result.offer.currency, Currency::Kzt);
        assert!(result.offer.delivery_term.as_deref().unwrap().contains("7 дней"));
        assert_eq!(result.confidence, 50);
    }

    #[test]
    fn empty_text_yields_empty_offer_at_base_confidence() {
        let result = FallbackExtractor::new().extract("");
        assert!(result.offer.total_price.is_none());
        assert!(result.offer.positions.is_empty());
        assert_eq!(result.offer.currency, Currency::Kzt);
        assert_eq!(result.confidence, 30);
    }

    #[test]
    fn garbage_never_fails() {
        let result = FallbackExtractor::new()
            .extract("@@@ ### +7 999 ::: \u{0000} ...);(фыва 0 0 0");
        assert_eq!(result.confidence, 30);
    }

    #[test]
    fn total_and_items_reach_full_confidence() {
        let text = "ИТОГО: 95000 тенге\nПерчатки рабочие 100 20000\nКаска защитная белая 50 75000";
        let result = FallbackExtractor::new().extract(text);
        assert_eq!(result.offer.positions.len(), 2);
        assert_eq!(result.offer.total_price, Some(dec("95000")));
        assert_eq!(result.confidence, 70);
    }

    #[test]
    fn missing_total_is_backfilled_from_item_sums() {
        let text = "Перчатки рабочие 100 20000\nКаска защитная белая 50 75000";
        let result = FallbackExtractor::new().extract(text);
        // One signal (items) found, so baseline stays at 50 even though the
        // total was back-filled.
        assert_eq!(result.confidence, 50);
        assert_eq!(result.offer.total_price, Some(dec("95000")));
    }

    #[test]
    fn items_only_signal_is_partial_confidence() {
        let result = FallbackExtractor::new().extract("Кирпич керамический М100 500 40000");
        assert_eq!(result.confidence, 50);
        assert_eq!(result.offer.positions.len(), 1);
    }
}
