//! Date parsing for offer validity.

use chrono::NaiveDate;

use super::patterns::VALID_UNTIL;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d.%m.%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%y",
    "%d/%m/%y",
    "%d-%m-%y",
];

/// Parse a date in any of the formats seen in supplier documents.
pub fn parse_lenient_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Extract the offer validity date, if any.
pub fn extract_valid_until(text: &str) -> Option<NaiveDate> {
    VALID_UNTIL
        .captures(text)
        .and_then(|caps| parse_lenient_date(&caps[1]))
}
