use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::ValidationError;

/// Parse a user-entered amount: currency symbols, thousands separators and
/// surrounding quotes are ignored, `(12.50)` reads as negative. Blank is zero.
pub(crate) fn parse_amount(s: &str) -> Result<Decimal, ValidationError> {
    let cleaned = s
        .replace(['$', '₹', '€', '£', ',', '"'], "")
        .replace('(', "-")
        .replace(')', "")
        .trim()
        .to_string();
    if cleaned.is_empty() {
        return Ok(Decimal::ZERO);
    }
    Decimal::from_str(&cleaned).map_err(|_| ValidationError::InvalidAmount(s.trim().to_string()))
}

/// Parse an amount that must not be negative (expenses, budget limits).
pub(crate) fn parse_non_negative(s: &str) -> Result<Decimal, ValidationError> {
    let amount = parse_amount(s)?;
    if amount < Decimal::ZERO {
        return Err(ValidationError::NegativeAmount(amount));
    }
    Ok(amount)
}

/// Format an amount with thousand separators and 2 decimal places.
/// e.g. `1234567.89` with `₹` → `"₹1,234,567.89"`
pub(crate) fn format_amount(val: Decimal, symbol: &str) -> String {
    let abs = val.abs();
    let formatted = format!("{abs:.2}");
    let mut parts = formatted.split('.');
    let int_part = parts.next().unwrap_or("0");
    let dec_part = parts.next().unwrap_or("00");

    let with_commas: String = int_part
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(",");

    if val < Decimal::ZERO {
        format!("-{symbol}{with_commas}.{dec_part}")
    } else {
        format!("{symbol}{with_commas}.{dec_part}")
    }
}
