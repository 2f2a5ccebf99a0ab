//! Lenient scalar coercion for positionally-encoded venue payloads
//!
//! Bitfinex delivers records as heterogeneous JSON arrays. Numbers sometimes
//! arrive as strings, integers as floats, and booleans as 0/1. These helpers
//! accept every representation the venue has been observed to use and return
//! `None` for anything else, so row decoders can drop malformed records
//! without failing the whole payload.

use serde_json::Value;

/// Coerce a JSON value to `f64`, accepting numbers and numeric strings.
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Coerce a JSON value to `i64`, truncating floats the way the venue's
/// millisecond timestamps and ids require.
pub fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s
            .parse::<i64>()
            .ok()
            .or_else(|| s.parse::<f64>().ok().map(|f| f as i64)),
        _ => None,
    }
}

/// Coerce a JSON value to `u32`; negative values are rejected.
pub fn as_u32(value: &Value) -> Option<u32> {
    as_i64(value).and_then(|i| u32::try_from(i).ok())
}

/// Borrow a JSON value as a string slice.
pub fn as_str(value: &Value) -> Option<&str> {
    value.as_str()
}

/// Coerce a JSON value to `bool`, accepting 0/1 numerics.
pub fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        _ => None,
    }
}
