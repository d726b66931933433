//! Loose value coercion
//!
//! Payload values arrive as arbitrary JSON (or as strings, for form bodies).
//! Integer fields accept anything and convert it the permissive way: strings
//! are read as far as they look numeric (`"1e3"` is 1000, `"12.9 kg"` is 12),
//! floats truncate toward zero, and out-of-range values saturate. Text fields
//! stringify scalars.

use serde_json::Value;

use super::policy::FieldKind;
use crate::store::BoundValue;

impl FieldKind {
    /// Coerce a present, non-null payload value for binding.
    pub fn coerce(self, value: &Value) -> BoundValue {
        match self {
            FieldKind::Integer => BoundValue::Int(to_int(value)),
            FieldKind::Text => BoundValue::Text(to_text(value)),
            FieldKind::Date => BoundValue::Date(to_text(value)),
        }
    }
}

/// Loose integer conversion of any JSON value.
///
/// - numbers: integers as-is, floats truncated, saturating at the `i64` bounds
/// - strings: see [`int_from_str`]
/// - booleans: `1` / `0`
/// - arrays and objects: `0` when empty, `1` otherwise
/// - null: `0`
pub fn to_int(value: &Value) -> i64 {
    match value {
        Value::Null => 0,
        Value::Bool(b) => i64::from(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i
            } else if n.as_u64().is_some() {
                i64::MAX
            } else {
                // `as` truncates toward zero, saturates, and maps NaN to 0
                n.as_f64().map_or(0, |f| f as i64)
            }
        },
        Value::String(s) => int_from_str(s),
        Value::Array(items) => i64::from(!items.is_empty()),
        Value::Object(map) => i64::from(!map.is_empty()),
    }
}

/// Read the leading number of a string as an integer.
///
/// Leading whitespace is skipped, then the longest prefix shaped like
/// `[+-]digits[.digits][e[+-]digits]` is taken. A plain integer prefix is read
/// exactly; one with a fraction or exponent goes through `f64` and truncates.
/// No digits yields `0`. Overflow saturates.
pub fn int_from_str(raw: &str) -> i64 {
    let trimmed = raw.trim_start_matches([' ', '\t', '\n', '\r', '\x0B', '\x0C']);
    let number = numeric_prefix(trimmed);

    if number.bytes().all(|b| b.is_ascii_digit() || b == b'-' || b == b'+') {
        leading_integer(number)
    } else {
        // `as` truncates toward zero and saturates
        number.parse::<f64>().map_or(0, |f| f as i64)
    }
}

fn leading_integer(number: &str) -> i64 {
    let (negative, digits) = match number.as_bytes().first() {
        Some(b'-') => (true, &number[1..]),
        Some(b'+') => (false, &number[1..]),
        _ => (false, number),
    };

    digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, b| {
            let digit = i64::from(b - b'0');
            if negative {
                acc.saturating_mul(10).saturating_sub(digit)
            } else {
                acc.saturating_mul(10).saturating_add(digit)
            }
        })
}

/// Longest numeric-looking prefix, or `""` when there are no mantissa digits.
fn numeric_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_digits = digits_from(end);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits_from(end + 1);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return "";
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = digits_from(exp);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }

    &s[..end]
}

/// Textual form of a JSON value.
///
/// Strings are taken verbatim, numbers use their JSON text, `true` is `"1"`
/// and `false` is empty. Arrays and objects become compact JSON.
pub fn to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
