//! Exact decimal arithmetic for monetary values.
//!
//! Amounts travel through the system as decimal strings (as returned by
//! subgraphs and price feeds) and are only ever operated on as
//! [`BigDecimal`]s, never as binary floating point numbers.

use {
    anyhow::{Context, Result, ensure},
    bigdecimal::{
        BigDecimal,
        Zero,
        num_bigint::{BigInt, Sign},
    },
    std::str::FromStr,
};

/// Largest decimal exponent (in either direction) accepted from input and
/// expanded when formatting.
pub const MAX_EXPONENT: u32 = 1_000;

/// Parses a decimal string.
///
/// Malformed input is an error: silently coercing it to zero would hide
/// broken money figures. So are exponents beyond [`MAX_EXPONENT`].
pub fn parse(value: &str) -> Result<BigDecimal> {
    let trimmed = value.trim();
    ensure!(!trimmed.is_empty(), "empty decimal string");
    let decimal =
        BigDecimal::from_str(trimmed).with_context(|| format!("invalid decimal {value:?}"))?;
    let (_, scale) = decimal.as_bigint_and_exponent();
    ensure!(
        bounded_exponent(scale).is_some(),
        "decimal exponent out of range in {value:?}"
    );
    Ok(decimal)
}

/// Formats a decimal as a plain string without exponent and without trailing
/// fractional zeros, e.g. `"40"`, `"0.5"` or `"-12.25"`.
///
/// Values whose exponent exceeds [`MAX_EXPONENT`] (only reachable through
/// arithmetic) keep the exact scientific notation instead.
pub fn format(value: &BigDecimal) -> String {
    if value.is_zero() {
        return "0".to_string();
    }
    let normalized = value.normalized();
    let (digits, scale) = normalized.as_bigint_and_exponent();
    let Some(exponent) = bounded_exponent(scale) else {
        return normalized.to_string();
    };
    if scale <= 0 {
        return (digits * BigInt::from(10).pow(exponent)).to_string();
    }

    let sign = if digits.sign() == Sign::Minus { "-" } else { "" };
    let mut magnitude = digits.magnitude().to_string();
    let Ok(scale) = usize::try_from(exponent) else {
        return normalized.to_string();
    };
    if magnitude.len() <= scale {
        magnitude.insert_str(0, &"0".repeat(scale - magnitude.len() + 1));
    }
    let (integer, fraction) = magnitude.split_at(magnitude.len() - scale);
    format!("{sign}{integer}.{fraction}")
}

fn bounded_exponent(scale: i64) -> Option<u32> {
    u32::try_from(scale.unsigned_abs())
        .ok()
        .filter(|exponent| *exponent <= MAX_EXPONENT)
}

/// Divides `numerator` by `denominator`, returning `None` on a zero
/// denominator.
pub fn checked_div(numerator: &BigDecimal, denominator: &BigDecimal) -> Option<BigDecimal> {
    if denominator.is_zero() {
        return None;
    }
    Some(numerator / denominator)
}

// String in, string out helpers for callers holding raw decimal strings. The
// enrichment itself works on `BigDecimal`.

pub fn add(a: &str, b: &str) -> Result<String> {
    Ok(format(&(parse(a)? + parse(b)?)))
}

pub fn sub(a: &str, b: &str) -> Result<String> {
    Ok(format(&(parse(a)? - parse(b)?)))
}

pub fn mul(a: &str, b: &str) -> Result<String> {
    Ok(format(&(parse(a)? * parse(b)?)))
}

/// String division. `Ok(None)` signals a zero divisor, errors are reserved
/// for malformed input.
pub fn div(a: &str, b: &str) -> Result<Option<String>> {
    Ok(checked_div(&parse(a)?, &parse(b)?).map(|quotient| format(&quotient)))
}
