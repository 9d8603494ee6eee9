//! Line item extraction: a tiered cascade over candidate lines.

use rust_decimal::{Decimal, RoundingStrategy};

use super::amounts::parse_amount;
use super::patterns::{BOT_TOKEN, ITEM_GENERIC, ITEM_ORDINAL, ITEM_SPECIFIC, PHONE_LIKE};
use crate::models::offer::{LineItem, Unit};

/// Extract line items from normalized text.
///
/// Each line is a candidate; the first successful tier wins per line:
/// 1. specific pattern (name, quantity, optional unit, price, currency);
/// 2. generic triple (text span, small integer, larger integer), with an
///    exclusion filter for chat-signature lines (phone numbers, emails,
///    bot/system names).
pub fn extract_line_items(text: &str) -> Vec<LineItem> {
    let mut items = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(item) = parse_specific(line) {
            items.push(item);
            continue;
        }
        if is_excluded(line) {
            continue;
        }
        if let Some(item) = parse_generic(line) {
            items.push(item);
        }
    }

    items
}

/// Common false positives in supplier chat signatures.
fn is_excluded(line: &str) -> bool {
    line.contains('@') || PHONE_LIKE.is_match(line) || BOT_TOKEN.is_match(line)
}

fn parse_specific(line: &str) -> Option<LineItem> {
    let caps = ITEM_SPECIFIC.captures(line)?;
    let name = clean_name(&caps["name"])?;
    let quantity = parse_quantity(&caps["qty"]);
    let unit = caps
        .name("unit")
        .map(|m| Unit::normalize(m.as_str()))
        .unwrap_or_default();
    let total = parse_amount(&caps["price"])?;

    Some(build_item(name, quantity, unit, total))
}

fn parse_generic(line: &str) -> Option<LineItem> {
    let caps = ITEM_GENERIC.captures(line)?;
    let quantity_raw: i64 = caps["qty"].parse().ok()?;
    let price_raw: i64 = caps["price"].parse().ok()?;
    // The smaller integer is the quantity candidate, the larger the price.
    if quantity_raw >= price_raw {
        return None;
    }
    let name = clean_name(&caps["name"])?;
    let quantity = parse_quantity(&caps["qty"]);
    let total = Decimal::from(price_raw);

    Some(build_item(name, quantity, Unit::default(), total))
}

fn build_item(name: String, quantity: Decimal, unit: Unit, total: Decimal) -> LineItem {
    LineItem {
        name,
        description: None,
        quantity,
        unit,
        unit_price: Some(derived_unit_price(total, quantity)),
        total_price: Some(total),
    }
}

/// Strip ordinal prefixes and trailing separators; empty names disqualify
/// the candidate.
fn clean_name(raw: &str) -> Option<String> {
    let name = ITEM_ORDINAL.replace(raw.trim(), "");
    let name = name.trim().trim_end_matches(['-', '—', ':', ',']).trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// A missing or non-positive quantity is coerced to the minimum positive
/// value.
fn parse_quantity(raw: &str) -> Decimal {
    match raw.parse::<i64>() {
        Ok(q) if q > 0 => Decimal::from(q),
        _ => Decimal::ONE,
    }
}

/// Unit price derived from the line total when no explicit unit price is
/// present.
fn derived_unit_price(total: Decimal, quantity: Decimal) -> Decimal {
    (total / quantity).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}
