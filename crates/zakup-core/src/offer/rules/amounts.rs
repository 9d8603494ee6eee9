//! Money amount parsing and extraction.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{CURRENCY, TOTAL_PRICE};
use crate::models::offer::Currency;

/// Parse a formatted amount (e.g. "1 500 000", "150000,50", "1234.56").
///
/// Thousands may be grouped with spaces or non-breaking spaces; the decimal
/// separator may be a comma or a period.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let commas = cleaned.matches(',').count();
    let normalized = if commas > 1 {
        // Multiple commas can only be thousands grouping.
        cleaned.replace(',', "")
    } else if cleaned.contains(',') && !cleaned.contains('.') {
        cleaned.replace(',', ".")
    } else if cleaned.contains(',') && cleaned.contains('.') {
        // Whichever separator comes last is the decimal one.
        let comma_pos = cleaned.rfind(',');
        let dot_pos = cleaned.rfind('.');
        match (comma_pos, dot_pos) {
            (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
            (Some(_), Some(_)) => cleaned.replace(',', ""),
            _ => cleaned,
        }
    } else {
        cleaned
    };

    Decimal::from_str(&normalized).ok()
}

/// Extract the total offer price: first money-context keyword followed by a
/// number.
pub fn extract_total_price(text: &str) -> Option<Decimal> {
    TOTAL_PRICE
        .captures(text)
        .and_then(|caps| parse_amount(&caps[1]))
}

/// Extract the offer currency from the first recognizable currency token.
pub fn extract_currency(text: &str) -> Option<Currency> {
    CURRENCY
        .captures(text)
        .and_then(|caps| Currency::from_token(&caps[1]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn parses_grouped_amounts() {
        assert_eq!(parse_amount("1 500 000"), Some(dec("1500000")));
        assert_eq!(parse_amount("1\u{00a0}234,56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("150000"), Some(dec("150000")));
    }

    #[test]
    fn parses_decimal_separators() {
        assert_eq!(parse_amount("1234,56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1234.56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1.234,56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1,234.56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1,234,567"), Some(dec("1234567")));
    }

    #[test]
    fn rejects_non_numbers() {
        assert_eq!(parse_amount("тенге"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn extracts_labeled_total() {
        assert_eq!(
            extract_total_price("ИТОГО: 150000 KZT"),
            Some(dec("150000"))
        );
        assert_eq!(
            extract_total_price("Всего к оплате 1 250 000,50 тенге"),
            Some(dec("1250000.50"))
        );
        assert_eq!(extract_total_price("Total: 9 500 USD"), Some(dec("9500")));
    }

    #[test]
    fn no_keyword_means_no_total() {
        assert_eq!(extract_total_price("в документе число 150000"), None);
    }

    #[test]
    fn extracts_currency_tokens() {
        assert_eq!(extract_currency("ИТОГО: 150000 KZT"), Some(Currency::Kzt));
        assert_eq!(extract_currency("сумма в тенге"), Some(Currency::Kzt));
        assert_eq!(extract_currency("1000 руб."), Some(Currency::Rub));
        assert_eq!(extract_currency("500 $"), Some(Currency::Usd));
        assert_eq!(extract_currency("оплата в евро"), Some(Currency::Eur));
        assert_eq!(extract_currency("без указания валюты"), None);
    }

    #[test]
    fn currency_word_is_not_matched_inside_other_words() {
        // "рубрика" must not read as rubles
        assert_eq!(extract_currency("рубрика закупок"), None);
    }
}
