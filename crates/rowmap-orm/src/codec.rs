//! Conversion between tagged values and SQLite wire values.
//!
//! | Kind | Wire value |
//! |------|-----------|
//! | Integer | INTEGER |
//! | Float | REAL |
//! | Text | TEXT |
//! | Boolean | INTEGER 0 or 1 |
//! | DateTime | INTEGER, milliseconds since the Unix epoch (UTC) |
//! | DateOnly | TEXT `YYYY-MM-DD`, month 1-12, signed outside 0000-9999 |
//! | Decimal | TEXT, canonical decimal string |
//! | Enum | TEXT, member name |
//!
//! NULL maps to NULL for every kind.
//!
//! [`encode`] refuses values the wire would alter: a NaN float, which SQLite
//! stores as NULL, and an instant with sub-millisecond digits.

use std::str::FromStr;

use chrono::{NaiveDate, TimeZone, Utc};
use rusqlite::types::{Value as SqlValue, ValueRef};
use rowmap_types::{Value, ValueError, ValueKind};
use rust_decimal::Decimal;

const DATE_FORMAT: &str = "%Y-%m-%d";
const NANOS_PER_MILLI: u32 = 1_000_000;

/// Encodes `value` as a wire value for a column of `kind`.
///
/// # Errors
///
/// `KindMismatch` if the value variant does not belong to `kind`,
/// `UnknownMember` for an enum name outside the enumeration, and
/// `Unrepresentable` for a value that would not read back unchanged.
pub fn encode(value: &Value, kind: ValueKind) -> Result<SqlValue, ValueError> {
    if !kind.accepts(value) {
        return Err(ValueError::mismatch(kind, value));
    }
    match (kind, value) {
        (ValueKind::Enum(e), Value::Enum(name)) if e.member(name).is_none() => {
            return Err(ValueError::UnknownMember {
                enumeration: e.name,
                member: name.clone(),
            });
        }
        (_, Value::Float(v)) if v.is_nan() => {
            return Err(unrepresentable(kind, v, "SQLite stores NaN as NULL"));
        }
        (_, Value::DateTime(v)) if v.timestamp_subsec_nanos() % NANOS_PER_MILLI != 0 => {
            return Err(unrepresentable(kind, v, "storage keeps whole milliseconds"));
        }
        _ => {}
    }
    Ok(to_wire(value))
}

/// Encodes `value` by its own variant, without a declared kind.
///
/// Used for ad-hoc query parameters, which carry no column metadata.
pub fn to_wire(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(v) => SqlValue::Integer(*v),
        Value::Float(v) => SqlValue::Real(*v),
        Value::Text(v) | Value::Enum(v) => SqlValue::Text(v.clone()),
        Value::Boolean(v) => SqlValue::Integer(i64::from(*v)),
        Value::DateTime(v) => SqlValue::Integer(v.timestamp_millis()),
        Value::DateOnly(v) => SqlValue::Text(v.format(DATE_FORMAT).to_string()),
        Value::Decimal(v) => SqlValue::Text(v.to_string()),
    }
}

/// Decodes a wire value read from a column of `kind`.
///
/// # Errors
///
/// `KindMismatch` if the wire type cannot hold `kind`, `Malformed` if text
/// does not parse, `UnknownMember` for an enum name outside the enumeration.
#[allow(clippy::cast_precision_loss)]
pub fn decode(raw: ValueRef<'_>, kind: ValueKind) -> Result<Value, ValueError> {
    if let ValueRef::Null = raw {
        return Ok(Value::Null);
    }

    match (kind, raw) {
        (ValueKind::Integer, ValueRef::Integer(v)) => Ok(Value::Integer(v)),
        (ValueKind::Float, ValueRef::Real(v)) => Ok(Value::Float(v)),
        (ValueKind::Float, ValueRef::Integer(v)) => Ok(Value::Float(v as f64)),
        (ValueKind::Text, ValueRef::Text(bytes)) => Ok(Value::Text(text(kind, bytes)?.to_string())),
        (ValueKind::Boolean, ValueRef::Integer(v)) => Ok(Value::Boolean(v != 0)),
        (ValueKind::DateTime, ValueRef::Integer(ms)) => Utc
            .timestamp_millis_opt(ms)
            .single()
            .map(Value::DateTime)
            .ok_or_else(|| malformed(kind, format!("timestamp {ms} out of range"))),
        (ValueKind::DateOnly, ValueRef::Text(bytes)) => {
            let s = text(kind, bytes)?;
            let (date, rest) = NaiveDate::parse_and_remainder(s, DATE_FORMAT)
                .map_err(|e| malformed(kind, format!("'{s}': {e}")))?;
            // A date-time string keeps only its calendar date.
            if rest.is_empty() || rest.starts_with([' ', 'T']) {
                Ok(Value::DateOnly(date))
            } else {
                Err(malformed(kind, format!("'{s}': trailing '{rest}'")))
            }
        }
        (ValueKind::Decimal, ValueRef::Text(bytes)) => {
            let s = text(kind, bytes)?;
            Decimal::from_str(s)
                .map(Value::Decimal)
                .map_err(|e| malformed(kind, format!("'{s}': {e}")))
        }
        (ValueKind::Decimal, ValueRef::Integer(v)) => Ok(Value::Decimal(Decimal::from(v))),
        (ValueKind::Decimal, ValueRef::Real(v)) => Decimal::try_from(v)
            .map(Value::Decimal)
            .map_err(|e| malformed(kind, format!("{v}: {e}"))),
        (ValueKind::Enum(e), ValueRef::Text(bytes)) => {
            let name = text(kind, bytes)?;
            e.member(name)
                .map(|m| Value::Enum(m.to_string()))
                .ok_or_else(|| ValueError::UnknownMember {
                    enumeration: e.name,
                    member: name.to_string(),
                })
        }
        (_, other) => Err(ValueError::KindMismatch {
            expected: kind.label(),
            found: wire_label(other),
        }),
    }
}

fn text(kind: ValueKind, bytes: &[u8]) -> Result<&str, ValueError> {
    std::str::from_utf8(bytes).map_err(|e| malformed(kind, e.to_string()))
}

fn malformed(kind: ValueKind, detail: String) -> ValueError {
    ValueError::Malformed {
        kind: kind.label(),
        detail,
    }
}

fn unrepresentable(kind: ValueKind, value: impl ToString, detail: &'static str) -> ValueError {
    ValueError::Unrepresentable {
        kind: kind.label(),
        value: value.to_string(),
        detail,
    }
}

fn wire_label(raw: ValueRef<'_>) -> &'static str {
    match raw {
        ValueRef::Null => "NULL",
        ValueRef::Integer(_) => "INTEGER",
        ValueRef::Real(_) => "REAL",
        ValueRef::Text(_) => "TEXT",
        ValueRef::Blob(_) => "BLOB",
    }
}
