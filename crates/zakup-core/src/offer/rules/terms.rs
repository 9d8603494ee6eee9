//! Company and delivery/payment term extraction.

use super::patterns::{COMPANY_BARE, COMPANY_QUOTED, DELIVERY_TERM, PAYMENT_TERM};

fn clean_phrase(s: &str) -> Option<String> {
    let s = s.trim().trim_end_matches([',', '-', '—', ':']).trim();
    if s.is_empty() { None } else { Some(s.to_string()) }
}

/// Extract the supplier company: legal-entity prefix followed by a quoted
/// or bare name.
pub fn extract_company(text: &str) -> Option<String> {
    if let Some(m) = COMPANY_QUOTED.find(text) {
        return Some(m.as_str().trim().to_string());
    }
    COMPANY_BARE.find(text).map(|m| m.as_str().trim().to_string())
}

/// Extract the delivery term phrase following a delivery/supply keyword.
pub fn extract_delivery_term(text: &str) -> Option<String> {
    DELIVERY_TERM
        .captures(text)
        .and_then(|caps| clean_phrase(&caps[1]))
}

/// Extract the payment term clause following a payment keyword.
pub fn extract_payment_term(text: &str) -> Option<String> {
    PAYMENT_TERM
        .captures(text)
        .and_then(|caps| clean_phrase(&caps[1]))
}
