//! Prompt construction for the structuring service.

pub const OFFER_SYSTEM_PROMPT: &str = r#"
You are a procurement document structuring assistant. Your ONLY role is to
convert raw commercial offer text into a fixed JSON structure.

RULES - ABSOLUTE, NO EXCEPTIONS:
1. Extract ONLY information explicitly stated in the document.
2. NEVER invent prices, quantities, or company names.
3. If a field is unclear or missing, output null for that field.
4. Numbers are plain JSON numbers: no currency symbols, no grouping.
5. Output MUST be a single valid JSON object and nothing else.
"#;

/// Build the structuring prompt for one document.
pub fn build_offer_prompt(text: &str, file_name: &str) -> String {
    format!(
        r#"Source file: {file_name}

<document>
{text}
</document>

Extract the commercial offer from the above document into the following
JSON structure. For any field not present in the document, use null.

{{
  "totalPrice": 0,
  "currency": "KZT | RUB | USD | EUR",
  "company": "supplier name or null",
  "deliveryTerm": "delivery terms or null",
  "paymentTerm": "payment terms or null",
  "validUntil": "YYYY-MM-DD or null",
  "positions": [
    {{
      "name": "item name",
      "description": "free text or null",
      "quantity": 1,
      "unit": "шт | кг | л | м | м2 | м3 | т",
      "unitPrice": 0,
      "totalPrice": 0
    }}
  ]
}}
"#
    )
}
