//! Money formatting for display.
//!
//! Prices are plain `rust_decimal::Decimal` values in Pakistani rupees; the
//! store is single-currency, so no currency code travels with amounts.
//! PKR has no fractional unit in practice, so whole-rupee amounts render
//! without decimals.

use rust_decimal::Decimal;

/// Format a rupee amount for display, e.g. `PKR 12,500`.
///
/// Whole amounts are rendered without a fractional part; non-whole amounts
/// keep two decimal places. The integer part is grouped with commas.
#[must_use]
pub fn format_pkr(amount: Decimal) -> String {
    let rounded = amount.round_dp(2).normalize();
    let text = rounded.to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (text, None),
    };

    let (sign, digits) = int_part
        .strip_prefix('-')
        .map_or(("", int_part.as_str()), |rest| ("-", rest));

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match frac_part {
        Some(f) => format!("PKR {sign}{grouped}.{f}"),
        None => format!("PKR {sign}{grouped}"),
    }
}
