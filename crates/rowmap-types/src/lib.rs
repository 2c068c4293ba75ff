//! Shared value model for the rowmap workspace.
//!
//! This crate defines the closed set of semantic value categories the mapper
//! understands ([`ValueKind`]), the tagged in-memory value that flows between
//! record fields and the codec ([`Value`]), and the [`FieldValue`] trait that
//! ties a Rust field type to exactly one kind at compile time.
//!
//! No crate in the workspace talks to the database from here. The codec that
//! turns a [`Value`] into a SQLite wire value lives in `rowmap-orm`.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

mod dialect;
mod field;

pub use dialect::{DatabaseType, ParseDatabaseTypeError};
pub use field::{FieldValue, PersistEnum};

#[doc(hidden)]
pub use field::enum_from_value;

/// Semantic category of a persistable field.
///
/// Every conversion in the codec is tagged with one of these. The set is
/// closed: a field type that does not map onto one of them cannot be
/// declared as a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Signed integer, stored as a 64-bit integer.
    Integer,
    /// Floating point number (single or double precision in memory).
    Float,
    /// UTF-8 text.
    Text,
    /// Boolean flag.
    Boolean,
    /// Instant in time with millisecond precision. Instants carrying
    /// sub-millisecond digits are rejected on encode.
    DateTime,
    /// Calendar date without a time of day.
    DateOnly,
    /// Arbitrary precision decimal number.
    Decimal,
    /// Enumeration persisted by member name.
    Enum(EnumKind),
}

impl ValueKind {
    /// Returns the label used in error messages and logs.
    pub fn label(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::DateTime => "datetime",
            Self::DateOnly => "date",
            Self::Decimal => "decimal",
            Self::Enum(e) => e.name,
        }
    }

    /// Returns `true` if `value` may be stored in a field of this kind.
    ///
    /// `Null` is accepted by every kind; nullability is a property of the
    /// field, not of the kind.
    pub fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (_, Value::Null)
                | (Self::Integer, Value::Integer(_))
                | (Self::Float, Value::Float(_))
                | (Self::Text, Value::Text(_))
                | (Self::Boolean, Value::Boolean(_))
                | (Self::DateTime, Value::DateTime(_))
                | (Self::DateOnly, Value::DateOnly(_))
                | (Self::Decimal, Value::Decimal(_))
                | (Self::Enum(_), Value::Enum(_))
        )
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Static description of an enumeration persisted by member name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumKind {
    /// Name of the Rust enum.
    pub name: &'static str,
    /// Member names in declaration order.
    pub members: &'static [&'static str],
}

impl EnumKind {
    /// Looks up a member by its exact name.
    pub fn member(&self, name: &str) -> Option<&'static str> {
        self.members.iter().copied().find(|m| *m == name)
    }
}

/// A typed in-memory value, one variant per [`ValueKind`] plus `Null`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value.
    Null,
    /// See [`ValueKind::Integer`].
    Integer(i64),
    /// See [`ValueKind::Float`].
    Float(f64),
    /// See [`ValueKind::Text`].
    Text(String),
    /// See [`ValueKind::Boolean`].
    Boolean(bool),
    /// See [`ValueKind::DateTime`].
    DateTime(DateTime<Utc>),
    /// See [`ValueKind::DateOnly`].
    DateOnly(NaiveDate),
    /// See [`ValueKind::Decimal`].
    Decimal(Decimal),
    /// Member name of an enumeration.
    Enum(String),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the label of the variant, for error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Boolean(_) => "boolean",
            Self::DateTime(_) => "datetime",
            Self::DateOnly(_) => "date",
            Self::Decimal(_) => "decimal",
            Self::Enum(_) => "enum",
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::DateTime(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Self::DateOnly(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Self::Decimal(v)
    }
}

/// Errors produced when a [`Value`] does not fit a field or a kind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    /// The value variant does not match the expected kind.
    #[error("expected {expected} value, found {found}")]
    KindMismatch {
        /// Label of the expected kind.
        expected: &'static str,
        /// Label of the value that was supplied.
        found: &'static str,
    },

    /// A NULL reached a field that cannot hold one.
    #[error("unexpected NULL for non-nullable {kind} field")]
    UnexpectedNull {
        /// Label of the field's kind.
        kind: &'static str,
    },

    /// A stored name matches no member of the enumeration.
    #[error("'{member}' is not a member of {enumeration}")]
    UnknownMember {
        /// Name of the enumeration.
        enumeration: &'static str,
        /// The stored name.
        member: String,
    },

    /// An integer does not fit the field's Rust type.
    #[error("integer {value} out of range for {target}")]
    OutOfRange {
        /// The stored integer.
        value: i64,
        /// Name of the target Rust type.
        target: &'static str,
    },

    /// A value fits its kind but has no exact wire form.
    #[error("{kind} value {value} cannot be stored exactly: {detail}")]
    Unrepresentable {
        /// Label of the kind being encoded.
        kind: &'static str,
        /// The rejected value, formatted.
        value: String,
        /// What the wire form would lose.
        detail: &'static str,
    },

    /// A stored value could not be parsed into the kind.
    #[error("malformed {kind} value: {detail}")]
    Malformed {
        /// Label of the kind being parsed.
        kind: &'static str,
        /// Parser diagnostic.
        detail: String,
    },
}

impl ValueError {
    /// Builds a [`ValueError::KindMismatch`] for `found` against `expected`.
    pub fn mismatch(expected: ValueKind, found: &Value) -> Self {
        Self::KindMismatch {
            expected: expected.label(),
            found: found.label(),
        }
    }
}
