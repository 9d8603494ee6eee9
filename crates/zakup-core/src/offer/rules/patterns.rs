//! Common regex patterns for offer field extraction.
//!
//! The keyword sets are localized for Russian/Kazakh supplier documents
//! with English fallbacks.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Total price: money-context keyword immediately followed by a number
    // with optional thousands grouping and decimal comma/period.
    pub static ref TOTAL_PRICE: Regex = Regex::new(
        r"(?i)(?:итого(?:\s+к\s+оплате)?|всего(?:\s+к\s+оплате)?|к\s+оплате|общая\s+сумма|сумма|общая\s+стоимость|стоимость|цена|total|sum|cost|price)\s*[:\-—]?\s*(\d{1,3}(?:[\s\u{00a0}]?\d{3})*(?:[.,]\d+)?)"
    ).unwrap();

    // Currency tokens: codes, symbols, and localized words.
    pub static ref CURRENCY: Regex = Regex::new(
        r"(?i)(тенге|tenge|\bтг\b|\bkzt\b|₸|\bруб(?:л[а-яё]*)?\b|\brub\b|₽|\bдоллар[а-яё]*\b|\busd\b|\$|\bевро\b|\beur\b|€)"
    ).unwrap();

    // Delivery term: keyword anchored, trailing duration phrase.
    pub static ref DELIVERY_TERM: Regex = Regex::new(
        r"(?i)(?:срок(?:и)?\s+поставки|доставка|поставка|отгрузка|delivery)\s*[:\-—]?\s*([^\n.;]{2,80})"
    ).unwrap();

    // Payment term: keyword anchored, trailing clause up to line end.
    pub static ref PAYMENT_TERM: Regex = Regex::new(
        r"(?i)(?:условия\s+оплаты|порядок\s+оплаты|оплата|предоплата|платеж|payment)\s*[:\-—]?\s*([^\n;]{2,120})"
    ).unwrap();

    // Company: legal-entity prefix with a quoted name.
    pub static ref COMPANY_QUOTED: Regex = Regex::new(
        r#"\b(?:ТОО|ООО|АО|ЗАО|ОАО|ИП|LLP|LLC|JSC)\s*[«"„]([^«»"„\n]{2,80})[»"]"#
    ).unwrap();

    // Company: legal-entity prefix with a bare capitalized name token.
    pub static ref COMPANY_BARE: Regex = Regex::new(
        r"\b(?:ТОО|ООО|АО|ЗАО|ОАО|ИП|LLP|LLC|JSC)\s+([А-ЯЁA-Z][\w\-]*)"
    ).unwrap();

    // Offer validity date.
    pub static ref VALID_UNTIL: Regex = Regex::new(
        r"(?i)(?:действительн\w*\s+до|срок\s+действия|действует\s+до|valid\s+until)\s*:?\s*(\d{4}-\d{2}-\d{2}|\d{1,2}[./\-]\d{1,2}[./\-]\d{2,4})"
    ).unwrap();

    // Line item, specific pattern: name cluster, integer quantity, optional
    // unit, grouped-digit price, currency token.
    pub static ref ITEM_SPECIFIC: Regex = Regex::new(
        r"(?i)^(?P<name>\S.{3,60}?)\s+(?P<qty>\d{1,4})\s*(?P<unit>шт\.?|штук|кг|л|м|т)?\s+(?P<price>\d{1,3}(?:[\s\u{00a0}]?\d{3})+|\d{4,})(?:[.,]\d+)?\s*(?:тг|тенге|kzt|₸|руб\.?|rub|₽|usd|\$|eur|€)"
    ).unwrap();

    // Line item, generic triple: text span of at least 8 characters, small
    // integer (quantity), larger integer (price).
    pub static ref ITEM_GENERIC: Regex = Regex::new(
        r"^(?P<name>\S.{7,79}?)\s+(?P<qty>\d{1,4})\s+(?P<price>\d{4,9})\s*$"
    ).unwrap();

    // Ordinal prefix on item lines ("1. ", "2)").
    pub static ref ITEM_ORDINAL: Regex = Regex::new(
        r"^\d{1,3}[.)]\s*"
    ).unwrap();

    // Exclusion filter for generic item candidates: chat signatures, not
    // line items.
    pub static ref PHONE_LIKE: Regex = Regex::new(
        r"\+7[\d\s\-()]{6,}"
    ).unwrap();

    pub static ref BOT_TOKEN: Regex = Regex::new(
        r"(?i)\b(?:bot|бот|whatsapp|telegram|система)\b"
    ).unwrap();
}
