//! Best-effort typing of values typed at the console.

use serde_json::{Number, Value};

/// Turn a raw console token into a field value.
///
/// Rules, first match wins:
/// 1. Integer: optional sign then ASCII digits, fitting in `i64`.
/// 2. Float: optional sign, digits around a single `.`, at least one digit.
/// 3. Quoted: wrapped in matching `"` or `'`; the quotes are stripped.
/// 4. Anything else is kept as the raw string.
///
/// Quoting is how a caller stores digits as a string: `"42"` stays `"42"`.
pub fn parse_value(raw: &str) -> Value {
    if is_integer(raw) {
        if let Ok(n) = raw.parse::<i64>() {
            return Value::from(n);
        }
    }

    if is_float(raw) {
        if let Some(n) = raw.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(n);
        }
    }

    if let Some(inner) = strip_quotes(raw) {
        return Value::from(inner);
    }

    Value::from(raw)
}

/// Strip one pair of matching surrounding quotes, if present.
pub fn strip_quotes(raw: &str) -> Option<&str> {
    let bytes = raw.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return Some(&raw[1..raw.len() - 1]);
        }
    }
    None
}

fn unsigned(raw: &str) -> &str {
    raw.strip_prefix(['-', '+']).unwrap_or(raw)
}

fn is_integer(raw: &str) -> bool {
    let digits = unsigned(raw);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_float(raw: &str) -> bool {
    let Some((whole, fraction)) = unsigned(raw).split_once('.') else {
        return false;
    };
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    (!whole.is_empty() || !fraction.is_empty()) && all_digits(whole) && all_digits(fraction)
}
