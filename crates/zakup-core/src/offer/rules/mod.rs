//! Rule-based field extractors for supplier offers.

pub mod amounts;
pub mod dates;
pub mod items;
pub mod patterns;
pub mod terms;

pub use amounts::{extract_currency, extract_total_price, parse_amount};
pub use dates::{extract_valid_until, parse_lenient_date};
pub use items::extract_line_items;
pub use terms::{extract_company, extract_delivery_term, extract_payment_term};
