//! Lenient conversions of resolved values
//!
//! Each function returns `None` when the value cannot be converted;
//! the typed accessors on `Config` turn that into the type's zero value.

use std::time::Duration;

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

use crate::value::Value;

/// Scalars formatted as text; null is the empty string
pub fn to_string(value: &Value) -> Option<String> {
    match value {
        Value::Sequence(_) | Value::Mapping(_) => None,
        other => Some(other.to_plain_string()),
    }
}

pub fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Null => Some(false),
        Value::Bool(b) => Some(*b),
        Value::Integer(i) => Some(*i != 0),
        Value::Float(f) => Some(*f != 0.0),
        Value::String(s) => match s.as_str() {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
            _ => None,
        },
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

pub fn to_i64(value: &Value) -> Option<i64> {
    to_integer(value).and_then(|i| i64::try_from(i).ok())
}

pub fn to_i32(value: &Value) -> Option<i32> {
    to_integer(value).and_then(|i| i32::try_from(i).ok())
}

pub fn to_u64(value: &Value) -> Option<u64> {
    to_integer(value).and_then(|i| u64::try_from(i).ok())
}

pub fn to_u32(value: &Value) -> Option<u32> {
    to_integer(value).and_then(|i| u32::try_from(i).ok())
}

pub fn to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Integer(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        Value::String(s) => s.parse().ok(),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Numbers are nanoseconds; strings use Go duration syntax (`1h30m`).
///
/// A string without any unit letter is read as nanoseconds.
pub fn to_duration(value: &Value) -> Option<Duration> {
    match value {
        Value::Null => Some(Duration::ZERO),
        Value::Integer(i) => u64::try_from(*i).ok().map(Duration::from_nanos),
        Value::Float(f) if f.is_finite() && *f >= 0.0 => Some(Duration::from_nanos(*f as u64)),
        Value::String(s) => {
            if s.contains(['n', 's', 'u', 'µ', 'm', 'h']) {
                parse_duration(s)
            } else {
                parse_duration(&format!("{}ns", s))
            }
        }
        _ => None,
    }
}

/// RFC 3339, `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DD` strings (UTC unless
/// an offset is given); integers are Unix seconds.
pub fn to_time(value: &Value) -> Option<OffsetDateTime> {
    match value {
        Value::Integer(secs) => OffsetDateTime::from_unix_timestamp(*secs).ok(),
        Value::String(s) => parse_time(s.trim()),
        _ => None,
    }
}

pub fn to_int_slice(value: &Value) -> Option<Vec<i64>> {
    value.as_sequence()?.iter().map(to_i64).collect()
}

/// Sequence elements as text, or a string split on whitespace
pub fn to_string_slice(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Sequence(seq) => Some(seq.iter().map(Value::to_plain_string).collect()),
        Value::String(s) => Some(s.split_whitespace().map(str::to_string).collect()),
        _ => None,
    }
}

fn to_integer(value: &Value) -> Option<i128> {
    match value {
        Value::Null => Some(0),
        Value::Bool(b) => Some(i128::from(*b)),
        Value::Integer(i) => Some(i128::from(*i)),
        Value::Float(f) if f.is_finite() => Some(f.trunc() as i128),
        Value::String(s) => parse_integer(s),
        _ => None,
    }
}

/// Integer literal with optional sign, `0x`/`0o`/`0b` or leading-zero
/// octal prefix, and an ignorable all-zero fraction (`"10.00"`).
fn parse_integer(text: &str) -> Option<i128> {
    let text = trim_zero_decimal(text);
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let (radix, digits) = match unsigned.get(..2) {
        Some("0x" | "0X") => (16, &unsigned[2..]),
        Some("0o" | "0O") => (8, &unsigned[2..]),
        Some("0b" | "0B") => (2, &unsigned[2..]),
        _ if unsigned.len() > 1 && unsigned.starts_with('0') => (8, &unsigned[1..]),
        _ => (10, unsigned),
    };
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }

    let magnitude = i128::from_str_radix(digits, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

fn trim_zero_decimal(text: &str) -> &str {
    match text.split_once('.') {
        Some((int, frac)) if !int.is_empty() && !frac.is_empty() && frac.bytes().all(|b| b == b'0') => int,
        _ => text,
    }
}

/// Parse a Go-style duration such as `300ms`, `1.5h` or `2h45m`.
/// Negative durations are rejected.
pub fn parse_duration(text: &str) -> Option<Duration> {
    let mut rest = text.strip_prefix('+').unwrap_or(text);
    if rest == "0" {
        return Some(Duration::ZERO);
    }
    if rest.is_empty() {
        return None;
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_len);
        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        rest = tail;

        let scale: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60 * 1_000_000_000,
            "h" => 3600 * 1_000_000_000,
            _ => return None,
        };

        let (whole, frac) = number.split_once('.').unwrap_or((number, ""));
        if whole.is_empty() && frac.is_empty() {
            return None;
        }
        let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
        let mut nanos = whole.checked_mul(scale)?;
        if !frac.is_empty() {
            let frac = &frac[..frac.len().min(18)];
            let numerator: u128 = frac.parse().ok()?;
            let denominator = 10u128.checked_pow(frac.len() as u32)?;
            nanos = nanos.checked_add(numerator.checked_mul(scale)? / denominator)?;
        }
        total = total.checked_add(nanos)?;
    }

    u64::try_from(total).ok().map(Duration::from_nanos)
}

fn parse_time(text: &str) -> Option<OffsetDateTime> {
    if let Ok(t) = OffsetDateTime::parse(text, &Rfc3339) {
        return Some(t);
    }
    let date_time = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    if let Ok(t) = PrimitiveDateTime::parse(text, date_time) {
        return Some(t.assume_utc());
    }
    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|d| d.midnight().assume_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_string() {
        assert_eq!(to_string(&Value::from("x")), Some("x".into()));
        assert_eq!(to_string(&Value::Integer(42)), Some("42".into()));
        assert_eq!(to_string(&Value::Float(1.5)), Some("1.5".into()));
        assert_eq!(to_string(&Value::Bool(true)), Some("true".into()));
        assert_eq!(to_string(&Value::Null), Some(String::new()));
        assert_eq!(to_string(&Value::from(vec![1])), None);
    }

    #[test]
    fn test_to_bool() {
        for s in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(to_bool(&Value::from(s)), Some(true), "{}", s);
        }
        for s in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(to_bool(&Value::from(s)), Some(false), "{}", s);
        }
        assert_eq!(to_bool(&Value::from("yes")), None);
        assert_eq!(to_bool(&Value::Integer(2)), Some(true));
        assert_eq!(to_bool(&Value::Float(0.0)), Some(false));
    }

    #[test]
    fn test_to_integers() {
        assert_eq!(to_i64(&Value::from("8080")), Some(8080));
        assert_eq!(to_i64(&Value::from("-12")), Some(-12));
        assert_eq!(to_i64(&Value::from("10.00")), Some(10));
        assert_eq!(to_i64(&Value::from("0x1F")), Some(31));
        assert_eq!(to_i64(&Value::from("0b101")), Some(5));
        assert_eq!(to_i64(&Value::from("010")), Some(8));
        assert_eq!(to_i64(&Value::from("0")), Some(0));
        assert_eq!(to_i64(&Value::from("10.5")), None);
        assert_eq!(to_i64(&Value::from("abc")), None);
        assert_eq!(to_i64(&Value::Float(3.9)), Some(3));
        assert_eq!(to_i64(&Value::Bool(true)), Some(1));
    }

    #[test]
    fn test_integer_widths() {
        assert_eq!(to_i32(&Value::Integer(i64::from(i32::MAX) + 1)), None);
        assert_eq!(to_u32(&Value::Integer(-1)), None);
        assert_eq!(to_u64(&Value::from("18446744073709551615")), Some(u64::MAX));
        assert_eq!(to_i64(&Value::from("18446744073709551615")), None);
    }

    #[test]
    fn test_to_f64() {
        assert_eq!(to_f64(&Value::from("2.5")), Some(2.5));
        assert_eq!(to_f64(&Value::Integer(2)), Some(2.0));
        assert_eq!(to_f64(&Value::from("x")), None);
    }

    #[test]
    fn test_to_duration() {
        assert_eq!(to_duration(&Value::from("1h30m")), Some(Duration::from_secs(5400)));
        assert_eq!(to_duration(&Value::from("250ms")), Some(Duration::from_millis(250)));
        assert_eq!(to_duration(&Value::from("1.5s")), Some(Duration::from_millis(1500)));
        assert_eq!(to_duration(&Value::from("10µs")), Some(Duration::from_micros(10)));
        assert_eq!(to_duration(&Value::from("1000")), Some(Duration::from_nanos(1000)));
        assert_eq!(to_duration(&Value::Integer(5)), Some(Duration::from_nanos(5)));
        assert_eq!(to_duration(&Value::from("0")), Some(Duration::ZERO));
        assert_eq!(to_duration(&Value::from("-1s")), None);
        assert_eq!(to_duration(&Value::from("5 minutes")), None);
        assert_eq!(to_duration(&Value::from("h")), None);
    }

    #[test]
    fn test_to_time() {
        let t = to_time(&Value::from("2024-01-15T10:30:00Z")).unwrap();
        assert_eq!(t.unix_timestamp(), 1_705_314_600);

        let t = to_time(&Value::from("2024-01-15")).unwrap();
        assert_eq!(t.unix_timestamp(), 1_705_276_800);

        let t = to_time(&Value::from("2024-01-15 10:30:00")).unwrap();
        assert_eq!(t.unix_timestamp(), 1_705_314_600);

        let t = to_time(&Value::Integer(86_400)).unwrap();
        assert_eq!(t.unix_timestamp(), 86_400);

        assert!(to_time(&Value::from("yesterday")).is_none());
    }

    #[test]
    fn test_slices() {
        let seq = Value::from(vec![Value::Integer(1), Value::from("2")]);
        assert_eq!(to_int_slice(&seq), Some(vec![1, 2]));
        assert_eq!(to_int_slice(&Value::from(vec!["x"])), None);
        assert_eq!(to_int_slice(&Value::from("1 2")), None);

        assert_eq!(
            to_string_slice(&Value::from(vec![Value::from("a"), Value::Integer(1)])),
            Some(vec!["a".to_string(), "1".to_string()])
        );
        assert_eq!(
            to_string_slice(&Value::from("a  b\tc")),
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
    }
}
