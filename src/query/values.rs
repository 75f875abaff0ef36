//! # Value Parsers
//!
//! Turn raw query option values into typed values: field lists, clamped
//! page bounds, filter trees.

use serde_json::Value;

use crate::grammar::{self, Expr, GrammarResult, OrderBy, ParsedValue};

/// Smallest page size
pub const MIN_LIMIT: u32 = 1;

/// Largest page size and largest offset
pub const MAX_LIMIT: u32 = 500;

/// Page size when `$top` is absent or not a number
pub const DEFAULT_LIMIT: u32 = 50;

/// Smallest offset
pub const MIN_OFFSET: u32 = 0;

/// Clamp `value` to `[low, high]`.
///
/// Without `high`, returns `value` if `value >= low`, else `low`. With
/// `high`, the lower bound is checked first: `value <= low` yields `low`,
/// then `value >= high` yields `high`.
pub fn clamp<T: PartialOrd + Copy>(value: T, low: T, high: Option<T>) -> T {
    match high {
        None => {
            if value >= low {
                value
            } else {
                low
            }
        }
        Some(high) => {
            if value <= low {
                low
            } else if value >= high {
                high
            } else {
                value
            }
        }
    }
}

/// Numeric coercion of a raw option value.
///
/// Absent and `null` values are not numbers. Strings follow the usual
/// query-string rules: surrounding whitespace is ignored, the empty string
/// is zero, `0x`/`0o`/`0b` prefixes and `Infinity` are accepted.
pub fn coerce_number(raw: Option<&Value>) -> f64 {
    match raw {
        None | Some(Value::Null) => f64::NAN,
        Some(Value::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => coerce_str(s),
        Some(Value::Array(_)) | Some(Value::Object(_)) => f64::NAN,
    }
}

fn coerce_str(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }

    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            return radix_digits(digits, radix);
        }
    }

    // f64's parser also accepts "inf" and "nan", which are not numbers here
    let numeric = s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !numeric {
        return f64::NAN;
    }

    s.parse::<f64>().unwrap_or(f64::NAN)
}

/// Digits after a radix prefix. No sign, at least one digit, and values
/// past `u64` keep growing as floats.
fn radix_digits(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    digits
        .chars()
        .try_fold(0.0f64, |acc, c| {
            c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
        })
        .unwrap_or(f64::NAN)
}

/// Parse `property=raw` with the grammar and return that option's value.
///
/// Returns `None` when `raw` is absent or empty.
pub fn parse(raw: Option<&str>, property: &str) -> GrammarResult<Option<ParsedValue>> {
    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok(None),
    };

    let mut parsed = grammar::parse(&format!("{}={}", property, raw))?;
    Ok(parsed.take(property))
}

/// `$select` field list; absent or empty selects `*`
pub fn parse_select(raw: Option<&str>) -> GrammarResult<Vec<String>> {
    match parse(raw, "$select")? {
        Some(ParsedValue::Fields(fields)) if !fields.is_empty() => Ok(fields),
        _ => Ok(vec!["*".to_string()]),
    }
}

/// `$expand` relation names; empty when absent
pub fn parse_expand(raw: Option<&str>) -> GrammarResult<Vec<String>> {
    match parse(raw, "$expand")? {
        Some(ParsedValue::Fields(fields)) => Ok(fields),
        _ => Ok(Vec::new()),
    }
}

/// `$orderby` items in request order; empty when absent
pub fn parse_orderby(raw: Option<&str>) -> GrammarResult<Vec<OrderBy>> {
    match parse(raw, "$orderby")? {
        Some(ParsedValue::OrderBy(items)) => Ok(items),
        _ => Ok(Vec::new()),
    }
}

/// `$filter` expression tree; `None` when absent
pub fn parse_filter_tree(raw: Option<&str>) -> GrammarResult<Option<Expr>> {
    match parse(raw, "$filter")? {
        Some(ParsedValue::Filter(expr)) => Ok(Some(expr)),
        _ => Ok(None),
    }
}

/// `$skip` clamped to `[0, 500]`; values that are not numbers become 0
pub fn parse_offset(raw: Option<&Value>) -> u32 {
    let value = coerce_number(raw);
    if value.is_nan() {
        return MIN_OFFSET;
    }
    clamp(value, MIN_OFFSET as f64, Some(MAX_LIMIT as f64)) as u32
}

/// `$top` clamped to `[1, 500]`; values that are not numbers become `default`
pub fn parse_limit(raw: Option<&Value>, default: u32) -> u32 {
    let mut value = coerce_number(raw);
    if value.is_nan() {
        value = default as f64;
    }
    clamp(value, MIN_LIMIT as f64, Some(MAX_LIMIT as f64)) as u32
}

/// Truthiness of `$count`: `null`, `false`, `0` and `""` are false, any
/// other value is true.
///
/// The string `"false"` is true here. Query strings are normalized to a
/// boolean before they reach this point, see
/// [`QueryObject::from_query_string`](super::QueryObject::from_query_string).
pub fn parse_count(raw: Option<&Value>) -> bool {
    match raw {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|n| n != 0.0).unwrap_or(false),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
