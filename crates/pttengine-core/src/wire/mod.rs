//! Untyped wire payload handling
//!
//! The native layer delivers events and history records as loosely-shaped
//! JSON objects: field presence and types are not guaranteed in transit, and
//! this crate is solely responsible for validating and defaulting them. The
//! accessors here encode the two-tier contract used throughout
//! [`decode`](crate::wire::decode): a *missing* field is an expected
//! condition handled by the caller (usually by dropping the record), while a
//! field that is present but corrupt is a contract violation surfaced as a
//! [`PttError`](crate::error::PttError).

pub mod decode;

use serde_json::Value;

use crate::error::{PttError, PttResult};

/// Borrow a string field.
pub(crate) fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

/// Copy a string field.
pub(crate) fn string_field(value: &Value, key: &str) -> Option<String> {
    str_field(value, key).map(str::to_owned)
}

/// Read a boolean field, treating absence (and any non-boolean) as false.
pub(crate) fn bool_field(value: &Value, key: &str) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// Read a non-negative integer field, treating absence as zero.
pub(crate) fn u32_field(value: &Value, key: &str) -> u32 {
    value
        .get(key)
        .and_then(Value::as_u64)
        .map(|n| n.min(u64::from(u32::MAX)) as u32)
        .unwrap_or(0)
}

/// Read a non-negative integer field as u64, treating absence as zero.
pub(crate) fn u64_field(value: &Value, key: &str) -> u64 {
    value.get(key).and_then(Value::as_u64).unwrap_or(0)
}

/// Read a floating-point field.
pub(crate) fn f64_field(value: &Value, key: &str) -> Option<f64> {
    value.get(key).and_then(Value::as_f64)
}

/// Read a timestamp field.
///
/// Timestamps travel as decimal-string integers (a native integer is also
/// accepted). Absence is `Ok(None)`; a present but unparseable value is the
/// hard-failure path and must not be swallowed by callers.
pub(crate) fn timestamp_field(value: &Value, key: &'static str) -> PttResult<Option<i64>> {
    let raw = match value.get(key) {
        Some(raw) if !raw.is_null() => raw,
        _ => return Ok(None),
    };
    match raw {
        Value::String(text) => match text.trim().parse::<i64>() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(PttError::MalformedTimestamp {
                field: key,
                value: text.clone(),
            }),
        },
        Value::Number(number) => number.as_i64().map(Some).ok_or(PttError::MalformedTimestamp {
            field: key,
            value: number.to_string(),
        }),
        other => Err(PttError::MalformedTimestamp {
            field: key,
            value: other.to_string(),
        }),
    }
}
