//! Commercial offer data models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Supported offer currencies. Anything outside this set is replaced with
/// the Kazakhstani tenge default rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Kazakhstani tenge.
    #[default]
    Kzt,
    /// Russian ruble.
    Rub,
    /// US dollar.
    Usd,
    /// Euro.
    Eur,
}

impl Currency {
    /// ISO 4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Kzt => "KZT",
            Currency::Rub => "RUB",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }

    /// Map a currency token (code, symbol, or localized word) to a currency.
    pub fn from_token(token: &str) -> Option<Self> {
        let t = token.trim().to_lowercase();
        if t.is_empty() {
            return None;
        }
        if t.starts_with("тенге") || t.starts_with("tenge") || t == "kzt" || t == "₸" || t == "тг" {
            Some(Currency::Kzt)
        } else if t.starts_with("руб") || t == "rub" || t == "₽" {
            Some(Currency::Rub)
        } else if t.starts_with("доллар") || t == "usd" || t == "$" {
            Some(Currency::Usd)
        } else if t.starts_with("евро") || t == "eur" || t == "€" {
            Some(Currency::Eur)
        } else {
            None
        }
    }
}

/// Canonical units of measure for line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Unit {
    /// Piece (штука).
    #[default]
    #[serde(rename = "шт")]
    Piece,
    /// Kilogram.
    #[serde(rename = "кг")]
    Kilogram,
    /// Litre.
    #[serde(rename = "л")]
    Litre,
    /// Metre.
    #[serde(rename = "м")]
    Metre,
    /// Square metre.
    #[serde(rename = "м2")]
    SquareMetre,
    /// Cubic metre.
    #[serde(rename = "м3")]
    CubicMetre,
    /// Tonne.
    #[serde(rename = "т")]
    Tonne,
}

impl Unit {
    /// Canonical token as it appears in supplier documents.
    pub fn token(&self) -> &'static str {
        match self {
            Unit::Piece => "шт",
            Unit::Kilogram => "кг",
            Unit::Litre => "л",
            Unit::Metre => "м",
            Unit::SquareMetre => "м2",
            Unit::CubicMetre => "м3",
            Unit::Tonne => "т",
        }
    }

    /// Normalize a free-form unit string to a canonical unit.
    ///
    /// Unrecognized or empty strings default to [`Unit::Piece`].
    pub fn normalize(raw: &str) -> Self {
        let u = raw
            .trim()
            .trim_matches('.')
            .replace('²', "2")
            .replace('³', "3")
            .to_lowercase();
        match u.as_str() {
            "шт" | "штук" | "штука" | "штуки" | "ед" | "единиц" | "единица" | "pcs" | "pc"
            | "piece" | "pieces" => Unit::Piece,
            "кг" | "килограмм" | "килограммов" | "kg" => Unit::Kilogram,
            "л" | "литр" | "литра" | "литров" | "l" => Unit::Litre,
            "м" | "метр" | "метра" | "метров" | "пог.м" | "m" => Unit::Metre,
            "м2" | "кв.м" | "кв. м" | "m2" => Unit::SquareMetre,
            "м3" | "куб.м" | "куб. м" | "m3" => Unit::CubicMetre,
            "т" | "тонн" | "тонна" | "тонны" | "t" => Unit::Tonne,
            _ => Unit::Piece,
        }
    }
}

/// A single priced product/service entry within an offer.
///
/// Invariant: every item that reaches the caller has a non-empty `name`
/// and a positive `quantity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Product/service name.
    pub name: String,

    /// Additional free-text description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Quantity, always positive.
    pub quantity: Decimal,

    /// Canonical unit of measure.
    pub unit: Unit,

    /// Price per unit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,

    /// Total price for the line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_price: Option<Decimal>,
}

/// Structured representation of a supplier's price quote.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructuredOffer {
    /// Total offer price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_price: Option<Decimal>,

    /// Offer currency (default: KZT).
    pub currency: Currency,

    /// Supplier company name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,

    /// Delivery terms, e.g. "в течение 7 дней".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_term: Option<String>,

    /// Payment terms, e.g. "предоплата 50%".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_term: Option<String>,

    /// Offer validity date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<NaiveDate>,

    /// Itemized line items, in document order.
    pub positions: Vec<LineItem>,
}

/// Which terminal path of the pipeline produced the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// The structuring service returned a valid offer.
    Structured,
    /// The deterministic fallback extractor produced the offer.
    Fallback,
    /// Extracted text was too short to attempt extraction.
    ShortText,
}

/// Final result of one pipeline invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Extracted offer data.
    pub offer: StructuredOffer,

    /// Extraction reliability estimate, 0-100.
    pub confidence: u8,

    /// Whether a human must verify the offer before it is trusted.
    pub needs_manual_review: bool,

    /// Normalized extracted text, truncated for audit/manual review.
    pub extracted_text: String,

    /// Original file name of the source document.
    pub source_file_name: String,

    /// Terminal pipeline path that produced this result.
    pub method: ExtractionMethod,

    /// Extraction warnings.
    pub warnings: Vec<String>,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}
