//! Confidence scoring and manual-review classification.

use crate::models::offer::StructuredOffer;

/// Review threshold: anything below this confidence needs a human.
const REVIEW_THRESHOLD: u8 = 60;

/// Baseline confidence for an offer produced by the structuring service.
pub fn structured_baseline(offer: &StructuredOffer) -> u8 {
    let has_total = offer.total_price.is_some();
    let has_positions = !offer.positions.is_empty();
    match (has_total, has_positions) {
        (true, true) => 95,
        (true, false) | (false, true) => 80,
        (false, false) if offer.company.is_some() => 70,
        (false, false) => 85,
    }
}

/// Apply the final confidence adjustments to an extractor baseline,
/// clamped to [0, 100].
pub fn adjusted_confidence(baseline: u8, offer: &StructuredOffer) -> u8 {
    let mut confidence = i32::from(baseline);
    if offer.total_price.is_none() && offer.positions.is_empty() {
        confidence -= 30;
    }
    if offer.company.is_none() {
        confidence -= 10;
    }
    if !offer.positions.is_empty() {
        confidence += 15;
    }
    confidence.clamp(0, 100) as u8
}

/// Final review decision.
///
/// `forced` carries the extractor's own verdict: the fallback path always
/// forces review regardless of computed confidence.
pub fn requires_review(confidence: u8, offer: &StructuredOffer, forced: bool) -> bool {
    forced
        || confidence < REVIEW_THRESHOLD
        || (offer.total_price.is_none() && offer.positions.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::offer::{LineItem, Unit};
    use rust_decimal::Decimal;

    fn item(name: &str) -> LineItem {
        LineItem {
            name: name.to_string(),
            description: None,
            quantity: Decimal::ONE,
            unit: Unit::Piece,
            unit_price: None,
            total_price: Some(Decimal::from(1000)),
        }
    }

    fn offer(total: bool, positions: usize, company: bool) -> StructuredOffer {
        StructuredOffer {
            total_price: total.then(|| Decimal::from(150000)),
            company: company.then(|| "ТОО Ромашка".to_string()),
            positions: (0..positions).map(|i| item(&format!("Позиция {i}"))).collect(),
            ..StructuredOffer::default()
        }
    }

    #[test]
    fn baseline_tiers() {
        assert_eq!(structured_baseline(&offer(true, 3, true)), 95);
        assert_eq!(structured_baseline(&offer(true, 0, false)), 80);
        assert_eq!(structured_baseline(&offer(false, 2, false)), 80);
        assert_eq!(structured_baseline(&offer(false, 0, true)), 70);
        assert_eq!(structured_baseline(&offer(false, 0, false)), 85);
    }

    #[test]
    fn adjustments_and_clamping() {
        // total + positions + company: 95 + 15 = 110, clamped to 100
        assert_eq!(adjusted_confidence(95, &offer(true, 3, true)), 100);
        // nothing at all: 85 - 30 - 10 = 45
        assert_eq!(adjusted_confidence(85, &offer(false, 0, false)), 45);
        // company only: 70 - 30 = 40
        assert_eq!(adjusted_confidence(70, &offer(false, 0, true)), 40);
        // low baseline clamps at zero
        assert_eq!(adjusted_confidence(10, &offer(false, 0, false)), 0);
    }

    #[test]
    fn confidence_stays_in_bounds() {
        for total in [false, true] {
            for positions in [0usize, 1, 5] {
                for company in [false, true] {
                    let o = offer(total, positions, company);
                    let c = adjusted_confidence(structured_baseline(&o), &o);
                    assert!(c <= 100);
                }
            }
        }
    }

    #[test]
    fn review_below_threshold() {
        let o = offer(true, 0, false);
        assert!(requires_review(59, &o, false));
        assert!(!requires_review(60, &o, false));
    }

    #[test]
    fn review_when_nothing_extracted() {
        let o = offer(false, 0, true);
        // Even high confidence cannot exempt an empty offer.
        assert!(requires_review(90, &o, false));
    }

    #[test]
    fn forced_review_wins() {
        let o = offer(true, 3, true);
        assert!(requires_review(100, &o, true));
        assert!(!requires_review(100, &o, false));
    }
}
