//! Lenient, locale-invariant parsing of line-item amounts.

use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::warn;

/// Parse a monetary attribute value.
///
/// Empty input is zero. Plain decimals (`1500.00`) and scientific notation
/// (`1.5e3`) are accepted. Anything else, including negative values, is
/// logged and treated as zero instead of failing the document.
pub(crate) fn parse_amount(raw: &str, attribute: &str) -> Decimal {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Decimal::ZERO;
    }

    if !is_numeric_literal(trimmed) {
        warn!(attribute, value = raw, "unparseable amount, using 0");
        return Decimal::ZERO;
    }

    let parsed = Decimal::from_str(trimmed).or_else(|_| Decimal::from_scientific(trimmed));
    match parsed {
        Ok(value) if value.is_zero() => Decimal::ZERO,
        Ok(value) if value.is_sign_positive() => value,
        Ok(_) => {
            warn!(attribute, value = raw, "negative amount, using 0");
            Decimal::ZERO
        }
        Err(_) => {
            warn!(attribute, value = raw, "unparseable amount, using 0");
            Decimal::ZERO
        }
    }
}

/// `[+-]digits[.digits][(e|E)[+-]digits]`, with digits on at least one side
/// of the point. Digit-group separators are not numeric.
fn is_numeric_literal(s: &str) -> bool {
    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(idx) => (&s[..idx], Some(&s[idx + 1..])),
        None => (s, None),
    };

    let unsigned = mantissa.strip_prefix(['+', '-']).unwrap_or(mantissa);
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if int_part.is_empty() && frac_part.is_empty() {
        return false;
    }
    if !all_digits(int_part) || !all_digits(frac_part) {
        return false;
    }

    match exponent {
        None => true,
        Some(exp) => {
            let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !digits.is_empty() && all_digits(digits)
        }
    }
}
