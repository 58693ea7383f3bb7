//! Typed scalar values held by the settings store.
//!
//! The store is permissive: a value written as one type may be read back as
//! another (a hand-edited file, an older release that used a different
//! type).  [`SettingValue::coerce`] converts any value into the kind a field
//! declares and falls back to that kind's zero value instead of failing.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The type a field declares for its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Bool,
    Int,
    Double,
    Text,
    Timestamp,
}

impl ValueKind {
    /// The value a malformed stored entry collapses to.
    pub fn zero(self) -> SettingValue {
        match self {
            ValueKind::Bool => SettingValue::Bool(false),
            ValueKind::Int => SettingValue::Int(0),
            ValueKind::Double => SettingValue::Double(0.0),
            ValueKind::Text => SettingValue::Text(String::new()),
            ValueKind::Timestamp => SettingValue::Timestamp(DateTime::<Utc>::default()),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Double => "double",
            ValueKind::Text => "text",
            ValueKind::Timestamp => "timestamp",
        };
        f.write_str(s)
    }
}

/// Error returned when user-supplied text cannot be parsed as a given kind.
///
/// Only raised at input boundaries (the CLI); reads from the store never
/// fail and use [`SettingValue::coerce`] instead.
#[derive(Debug, Error, PartialEq)]
#[error("cannot parse {input:?} as {kind}")]
pub struct ValueParseError {
    pub kind: ValueKind,
    pub input: String,
}

/// A single stored scalar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl SettingValue {
    /// Returns the kind this value currently holds.
    pub fn kind(&self) -> ValueKind {
        match self {
            SettingValue::Bool(_) => ValueKind::Bool,
            SettingValue::Int(_) => ValueKind::Int,
            SettingValue::Double(_) => ValueKind::Double,
            SettingValue::Text(_) => ValueKind::Text,
            SettingValue::Timestamp(_) => ValueKind::Timestamp,
        }
    }

    /// Converts this value into `kind`.
    ///
    /// Numeric kinds convert between each other (doubles truncate toward
    /// zero), booleans map to and from `0`/`1`, text is parsed, and anything
    /// that cannot be interpreted becomes `kind.zero()`.
    pub fn coerce(self, kind: ValueKind) -> SettingValue {
        if self.kind() == kind {
            return self;
        }
        let coerced = match (kind, self) {
            (ValueKind::Bool, SettingValue::Int(i)) => Some(SettingValue::Bool(i != 0)),
            (ValueKind::Bool, SettingValue::Double(d)) => Some(SettingValue::Bool(d != 0.0)),
            (ValueKind::Bool, SettingValue::Text(s)) => parse_bool(&s).map(SettingValue::Bool),

            (ValueKind::Int, SettingValue::Bool(b)) => Some(SettingValue::Int(i64::from(b))),
            (ValueKind::Int, SettingValue::Double(d)) if d.is_finite() => {
                Some(SettingValue::Int(d.trunc() as i64))
            }
            (ValueKind::Int, SettingValue::Text(s)) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| {
                        s.parse::<f64>()
                            .ok()
                            .filter(|d| d.is_finite())
                            .map(|d| d.trunc() as i64)
                    })
                    .map(SettingValue::Int)
            }

            (ValueKind::Double, SettingValue::Bool(b)) => {
                Some(SettingValue::Double(if b { 1.0 } else { 0.0 }))
            }
            (ValueKind::Double, SettingValue::Int(i)) => Some(SettingValue::Double(i as f64)),
            (ValueKind::Double, SettingValue::Text(s)) => {
                s.trim().parse::<f64>().ok().map(SettingValue::Double)
            }

            (ValueKind::Text, other) => Some(SettingValue::Text(other.to_string())),

            (ValueKind::Timestamp, SettingValue::Text(s)) => DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| SettingValue::Timestamp(dt.with_timezone(&Utc))),

            _ => None,
        };
        coerced.unwrap_or_else(|| kind.zero())
    }

    /// Parses user-supplied text as `kind`, failing instead of falling back
    /// to the zero value.
    ///
    /// # Errors
    ///
    /// Returns [`ValueParseError`] when `input` is not a valid `kind`.
    pub fn parse_as(kind: ValueKind, input: &str) -> Result<SettingValue, ValueParseError> {
        let err = || ValueParseError {
            kind,
            input: input.to_string(),
        };
        let trimmed = input.trim();
        match kind {
            ValueKind::Bool => parse_bool(trimmed).map(SettingValue::Bool).ok_or_else(err),
            ValueKind::Int => trimmed.parse().map(SettingValue::Int).map_err(|_| err()),
            ValueKind::Double => trimmed.parse().map(SettingValue::Double).map_err(|_| err()),
            ValueKind::Text => Ok(SettingValue::Text(input.to_string())),
            ValueKind::Timestamp => DateTime::parse_from_rfc3339(trimmed)
                .map(|dt| SettingValue::Timestamp(dt.with_timezone(&Utc)))
                .map_err(|_| err()),
        }
    }

    /// Returns the value as a bool, coercing if needed.
    pub fn as_bool(&self) -> bool {
        matches!(self.clone().coerce(ValueKind::Bool), SettingValue::Bool(true))
    }

    /// Returns the value as an integer, coercing if needed.
    pub fn as_int(&self) -> i64 {
        match self.clone().coerce(ValueKind::Int) {
            SettingValue::Int(i) => i,
            _ => 0,
        }
    }

    /// Returns the value as a double, coercing if needed.
    pub fn as_double(&self) -> f64 {
        match self.clone().coerce(ValueKind::Double) {
            SettingValue::Double(d) => d,
            _ => 0.0,
        }
    }

    /// Returns the value as text, coercing if needed.
    pub fn into_text(self) -> String {
        match self.coerce(ValueKind::Text) {
            SettingValue::Text(s) => s,
            _ => String::new(),
        }
    }

    /// Equality used by the unchanged-value checks.
    ///
    /// Same as `==` except that two NaN doubles are the same value, so
    /// repeating a NaN write is recognised as a no-op.
    pub fn same_as(&self, other: &SettingValue) -> bool {
        match (self, other) {
            (SettingValue::Double(a), SettingValue::Double(b)) => {
                a == b || (a.is_nan() && b.is_nan())
            }
            _ => self == other,
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(b) => write!(f, "{b}"),
            SettingValue::Int(i) => write!(f, "{i}"),
            SettingValue::Double(d) => write!(f, "{d}"),
            SettingValue::Text(s) => f.write_str(s),
            SettingValue::Timestamp(t) => f.write_str(&t.to_rfc3339()),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(b: bool) -> Self {
        SettingValue::Bool(b)
    }
}

impl From<i64> for SettingValue {
    fn from(i: i64) -> Self {
        SettingValue::Int(i)
    }
}

impl From<f64> for SettingValue {
    fn from(d: f64) -> Self {
        SettingValue::Double(d)
    }
}

impl From<&str> for SettingValue {
    fn from(s: &str) -> Self {
        SettingValue::Text(s.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(s: String) -> Self {
        SettingValue::Text(s)
    }
}

impl From<DateTime<Utc>> for SettingValue {
    fn from(t: DateTime<Utc>) -> Self {
        SettingValue::Timestamp(t)
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
