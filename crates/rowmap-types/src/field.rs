//! Conversions between Rust field types and [`Value`].

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::{EnumKind, Value, ValueError, ValueKind};

/// A Rust type that can back a mapped column.
///
/// The implementing type fixes the column's [`ValueKind`] and nullability at
/// compile time, so a declared column can never resolve to zero or two kinds.
/// `Option<T>` is the nullable form of `T`.
pub trait FieldValue: Sized {
    /// Kind of every value produced by [`FieldValue::to_value`].
    const KIND: ValueKind;

    /// Whether the field accepts [`Value::Null`].
    const NULLABLE: bool = false;

    /// Reads the field as a tagged value.
    fn to_value(&self) -> Value;

    /// Rebuilds the field from a tagged value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError` when the variant does not match [`Self::KIND`],
    /// when a NULL reaches a non-nullable field, or when the value is out of
    /// range for the Rust type.
    fn from_value(value: Value) -> Result<Self, ValueError>;
}

macro_rules! copy_field_value {
    ($ty:ty, $variant:ident) => {
        impl FieldValue for $ty {
            const KIND: ValueKind = ValueKind::$variant;

            fn to_value(&self) -> Value {
                Value::$variant(*self)
            }

            fn from_value(value: Value) -> Result<Self, ValueError> {
                match value {
                    Value::$variant(v) => Ok(v),
                    Value::Null => Err(ValueError::UnexpectedNull {
                        kind: Self::KIND.label(),
                    }),
                    other => Err(ValueError::mismatch(Self::KIND, &other)),
                }
            }
        }
    };
}

copy_field_value!(i64, Integer);
copy_field_value!(f64, Float);
copy_field_value!(bool, Boolean);
copy_field_value!(DateTime<Utc>, DateTime);
copy_field_value!(NaiveDate, DateOnly);
copy_field_value!(Decimal, Decimal);

impl FieldValue for String {
    const KIND: ValueKind = ValueKind::Text;

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Text(v) => Ok(v),
            Value::Null => Err(ValueError::UnexpectedNull {
                kind: Self::KIND.label(),
            }),
            other => Err(ValueError::mismatch(Self::KIND, &other)),
        }
    }
}

impl FieldValue for i32 {
    const KIND: ValueKind = ValueKind::Integer;

    fn to_value(&self) -> Value {
        Value::Integer(i64::from(*self))
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Integer(v) => Self::try_from(v).map_err(|_| ValueError::OutOfRange {
                value: v,
                target: "i32",
            }),
            Value::Null => Err(ValueError::UnexpectedNull {
                kind: Self::KIND.label(),
            }),
            other => Err(ValueError::mismatch(Self::KIND, &other)),
        }
    }
}

impl FieldValue for f32 {
    const KIND: ValueKind = ValueKind::Float;

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(v) => Ok(v as f32),
            Value::Null => Err(ValueError::UnexpectedNull {
                kind: Self::KIND.label(),
            }),
            other => Err(ValueError::mismatch(Self::KIND, &other)),
        }
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    const KIND: ValueKind = T::KIND;
    const NULLABLE: bool = true;

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, T::to_value)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        if value.is_null() {
            return Ok(None);
        }
        T::from_value(value).map(Some)
    }
}

/// An enumeration persisted by member name.
///
/// Usually implemented through [`persist_enum!`](crate::persist_enum), which
/// also implements [`FieldValue`] for the enum.
pub trait PersistEnum: Sized + 'static {
    /// Static description of the enumeration.
    const KIND: EnumKind;

    /// Returns the persisted name of this member.
    fn member(&self) -> &'static str;

    /// Resolves a persisted name back into a member.
    fn from_member(name: &str) -> Option<Self>;
}

/// Rebuilds an enum member from a tagged value.
///
/// Text values are accepted alongside [`Value::Enum`] so that query
/// parameters written as plain strings resolve the same way.
pub fn enum_from_value<E: PersistEnum>(value: Value) -> Result<E, ValueError> {
    match value {
        Value::Enum(name) | Value::Text(name) => {
            E::from_member(&name).ok_or(ValueError::UnknownMember {
                enumeration: E::KIND.name,
                member: name,
            })
        }
        Value::Null => Err(ValueError::UnexpectedNull {
            kind: E::KIND.name,
        }),
        other => Err(ValueError::mismatch(ValueKind::Enum(E::KIND), &other)),
    }
}

/// Declares an enum whose members persist by name.
///
/// ```rust,ignore
/// rowmap_types::persist_enum! {
///     #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
///     pub enum Genre {
///         #[default]
///         Fiction,
///         Poetry,
///     }
/// }
/// ```
#[macro_export]
macro_rules! persist_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $crate::PersistEnum for $name {
            const KIND: $crate::EnumKind = $crate::EnumKind {
                name: stringify!($name),
                members: &[$(stringify!($variant)),+],
            };

            fn member(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),+
                }
            }

            fn from_member(name: &str) -> Option<Self> {
                match name {
                    $(stringify!($variant) => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl $crate::FieldValue for $name {
            const KIND: $crate::ValueKind =
                $crate::ValueKind::Enum(<$name as $crate::PersistEnum>::KIND);

            fn to_value(&self) -> $crate::Value {
                $crate::Value::Enum($crate::PersistEnum::member(self).to_string())
            }

            fn from_value(value: $crate::Value) -> Result<Self, $crate::ValueError> {
                $crate::enum_from_value(value)
            }
        }
    };
}
