//! Parse and validate structuring service responses.
//!
//! The remote model returns loosely-typed JSON; nothing loosely-typed is
//! allowed past this module. Every field is explicitly coerced into the
//! typed offer or defaulted.

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use serde_json::Value;

use crate::error::StructuringError;
use crate::models::offer::{Currency, LineItem, StructuredOffer, Unit};
use crate::offer::rules::{parse_amount, parse_lenient_date};

/// Loosely-typed response shape, exactly as the service returns it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawOffer {
    #[serde(default, alias = "total_price")]
    total_price: Option<Value>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    company: Option<String>,
    #[serde(default, alias = "delivery_term")]
    delivery_term: Option<String>,
    #[serde(default, alias = "payment_term")]
    payment_term: Option<String>,
    #[serde(default, alias = "valid_until")]
    valid_until: Option<String>,
    #[serde(default)]
    positions: Vec<Value>,
}

/// Parse the raw model output into the loose response shape.
///
/// Accepts either a bare JSON object or one wrapped in a ```json fence.
pub(crate) fn parse_offer_response(response: &str) -> Result<RawOffer, StructuringError> {
    let json = extract_json(response)?;
    serde_json::from_str(json).map_err(|e| StructuringError::JsonParsing(e.to_string()))
}

fn extract_json(response: &str) -> Result<&str, StructuringError> {
    if let Some(start) = response.find("```json") {
        let body = &response[start + 7..];
        let end = body
            .find("```")
            .ok_or_else(|| StructuringError::MalformedResponse("unclosed JSON fence".into()))?;
        return Ok(body[..end].trim());
    }
    let start = response
        .find('{')
        .ok_or_else(|| StructuringError::MalformedResponse("no JSON object found".into()))?;
    let end = response
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or_else(|| StructuringError::MalformedResponse("no JSON object found".into()))?;
    Ok(response[start..=end].trim())
}

/// Coerce the loose response into a fully-typed offer.
///
/// Positions with an empty name are discarded; a missing or non-positive
/// quantity is coerced to the minimum positive value; an unknown currency
/// becomes the KZT default.
pub(crate) fn validate_offer(raw: RawOffer) -> StructuredOffer {
    StructuredOffer {
        total_price: raw.total_price.as_ref().and_then(coerce_decimal),
        currency: raw
            .currency
            .as_deref()
            .and_then(Currency::from_token)
            .unwrap_or_default(),
        company: clean_string(raw.company),
        delivery_term: clean_string(raw.delivery_term),
        payment_term: clean_string(raw.payment_term),
        valid_until: raw.valid_until.as_deref().and_then(parse_lenient_date),
        positions: raw.positions.iter().filter_map(sanitize_position).collect(),
    }
}

fn sanitize_position(value: &Value) -> Option<LineItem> {
    let obj = value.as_object()?;

    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|n| !n.is_empty())?
        .to_string();

    let quantity = obj
        .get("quantity")
        .and_then(coerce_decimal)
        .filter(|q| *q > Decimal::ZERO)
        .unwrap_or(Decimal::ONE);

    let unit = obj
        .get("unit")
        .and_then(Value::as_str)
        .map(Unit::normalize)
        .unwrap_or_default();

    Some(LineItem {
        name,
        description: clean_string(
            obj.get("description").and_then(Value::as_str).map(String::from),
        ),
        quantity,
        unit,
        unit_price: obj.get("unitPrice").or_else(|| obj.get("unit_price")).and_then(coerce_decimal),
        total_price: obj
            .get("totalPrice")
            .or_else(|| obj.get("total_price"))
            .and_then(coerce_decimal),
    })
}

/// Accept numbers as JSON numbers or as formatted strings.
fn coerce_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else {
                n.as_f64().and_then(Decimal::from_f64)
            }
        }
        Value::String(s) => parse_amount(s),
        _ => None,
    }
}

fn clean_string(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && s != "null")
}
