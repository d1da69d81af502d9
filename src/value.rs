//! Typed cell values with explicit per-variant equality rules

use chrono::{NaiveDateTime, Timelike};
use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel used for null and NaN in canonical and normalized form
pub const NULL_SENTINEL: &str = "NA";

/// Largest integer an f64 holds exactly (2^53)
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Integer magnitudes above this stay text so distinct ids stay distinct
pub const MAX_EXACT_INTEGER: u64 = 1 << 53;

/// A single cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Number(f64),
    Text(String),
    Boolean(bool),
    Timestamp(NaiveDateTime),
}

impl Value {
    /// Number when exact in an f64, otherwise the decimal digits as text
    pub fn from_i64(n: i64) -> Self {
        if n.unsigned_abs() > MAX_EXACT_INTEGER {
            Value::Text(n.to_string())
        } else {
            Value::Number(n as f64)
        }
    }

    pub fn from_u64(n: u64) -> Self {
        if n > MAX_EXACT_INTEGER {
            Value::Text(n.to_string())
        } else {
            Value::Number(n as f64)
        }
    }

    /// Null and NaN both count as missing
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Number(n) => n.is_nan(),
            _ => false,
        }
    }

    /// Canonical string form, the input to key normalization
    pub fn canonical(&self) -> String {
        match self {
            Value::Null => NULL_SENTINEL.to_string(),
            Value::Number(n) if n.is_nan() => NULL_SENTINEL.to_string(),
            Value::Number(n) => format_number(*n),
            Value::Text(s) => s.clone(),
            Value::Boolean(b) => b.to_string(),
            Value::Timestamp(ts) => format_timestamp(ts),
        }
    }

    /// Equality used for cell-level attribution.
    ///
    /// Null matches only null (NaN counts as null). Numbers compare
    /// numerically, text compares after normalization, booleans and
    /// timestamps compare exactly. Mixed variants fall back to comparing
    /// normalized canonical forms, so `Text("1")` matches `Number(1.0)`.
    pub fn matches(&self, other: &Value) -> bool {
        match (self, other) {
            (a, b) if a.is_null() || b.is_null() => a.is_null() && b.is_null(),
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => {
                crate::normalize::normalize_str(a) == crate::normalize::normalize_str(b)
            }
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (a, b) => crate::normalize::normalize(a) == crate::normalize::normalize(b),
        }
    }
}

fn format_number(n: f64) -> String {
    if n == 0.0 {
        // Also folds -0.0
        return "0".to_string();
    }
    if n.is_finite() && n.fract() == 0.0 && n.abs() < EXACT_INTEGER_LIMIT {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn format_timestamp(ts: &NaiveDateTime) -> String {
    if ts.nanosecond() == 0 {
        ts.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        ts.format("%Y-%m-%d %H:%M:%S%.f").to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::from_i64(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(ts: NaiveDateTime) -> Self {
        Value::Timestamp(ts)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Number(n) if n.is_nan() => serializer.serialize_none(),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < EXACT_INTEGER_LIMIT => {
                serializer.serialize_i64(*n as i64)
            }
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Timestamp(ts) => serializer.serialize_str(&format_timestamp(ts)),
        }
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("null, a number, a boolean or a string")
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> std::result::Result<Value, D::Error> {
        Value::deserialize(d)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Value, E> {
        Ok(Value::Boolean(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Value, E> {
        Ok(Value::from_i64(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Value, E> {
        Ok(Value::from_u64(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Value, E> {
        Ok(Value::Number(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Value, E> {
        Ok(Value::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Value, E> {
        Ok(Value::Text(v))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}
