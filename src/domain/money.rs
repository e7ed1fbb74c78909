//! Money arithmetic. Prices are `Decimal`; display and rounding are fixed at 2 places.
//!
//! Rounding is half away from zero everywhere (bill total and per-person shares).

use crate::domain::DomainError;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Number of decimal places kept for any monetary amount shown to the user.
pub const CENTS_DP: u32 = 2;

/// Round to cents, half away from zero. The result always carries scale 2.
pub fn round_cents(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(CENTS_DP, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(CENTS_DP);
    rounded
}

/// Largest price magnitude accepted from text. Keeps sums of many items far from
/// the `Decimal` range.
fn max_amount() -> Decimal {
    Decimal::from(1_000_000_000_000_000_i64)
}

/// `a + b`, clamped to the `Decimal` range instead of panicking.
pub fn saturating_add(a: Decimal, b: Decimal) -> Decimal {
    a.checked_add(b).unwrap_or(if b.is_sign_negative() {
        Decimal::MIN
    } else {
        Decimal::MAX
    })
}

/// Overflow-safe sum.
pub fn sum(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    values.into_iter().fold(Decimal::ZERO, saturating_add)
}

/// Format as a plain two-decimal string ("12.50").
pub fn format_cents(value: Decimal) -> String {
    round_cents(value).to_string()
}

/// Lenient price parsing: the longest leading numeric prefix, or zero.
///
/// `"12.50abc"` is 12.50, `"$5"`, `""` and `"abc"` are 0. Magnitudes of 10^15 and
/// above are 0 too. Never fails.
pub fn parse_lenient(raw: &str) -> Decimal {
    let prefix = numeric_prefix(raw.trim());
    if prefix.is_empty() {
        return Decimal::ZERO;
    }
    to_decimal(prefix)
        .filter(|v| v.abs() < max_amount())
        .unwrap_or(Decimal::ZERO)
}

/// Strict price parsing. The whole (trimmed) text must be a non-negative number.
pub fn parse_strict(raw: &str) -> Result<Decimal, DomainError> {
    let trimmed = raw.trim();
    let invalid = || DomainError::InvalidPrice(raw.to_string());
    if trimmed.is_empty() || numeric_prefix(trimmed).len() != trimmed.len() {
        return Err(invalid());
    }
    let value = to_decimal(trimmed).ok_or_else(invalid)?;
    if (value.is_sign_negative() && !value.is_zero()) || value >= max_amount() {
        return Err(invalid());
    }
    Ok(value)
}

/// Parses a validated numeric prefix, filling in the leading zero of `.5`.
fn to_decimal(prefix: &str) -> Option<Decimal> {
    let (negative, unsigned) = match prefix.as_bytes().first() {
        Some(b'-') => (true, &prefix[1..]),
        Some(b'+') => (false, &prefix[1..]),
        _ => (false, prefix),
    };
    let value = if unsigned.starts_with('.') {
        Decimal::from_str(&format!("0{unsigned}")).ok()?
    } else {
        Decimal::from_str(unsigned).ok()?
    };
    Some(if negative { -value } else { value })
}

/// `[+-]?digits[.digits]`, also accepting `.5` and `5.`. Returns "" when no digit is present.
fn numeric_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        let frac_digits = frac_end - frac_start;
        if digits + frac_digits > 0 {
            digits += frac_digits;
            end = if frac_digits > 0 { frac_end } else { end };
        }
    }
    if digits == 0 {
        return "";
    }
    &s[..end]
}
