//! Column name to field mapping.

use std::any::type_name;

use rusqlite::types::{Value as SqlValue, ValueRef};
use rowmap_types::{Value, ValueKind};

use crate::codec;
use crate::error::OrmError;
use crate::metadata::{Reader, Record, Table, Writer};

/// One mapped field of a record.
pub struct FieldDescriptor<R> {
    column: &'static str,
    kind: ValueKind,
    nullable: bool,
    skip_on_write: bool,
    read: Reader<R>,
    write: Writer<R>,
}

impl<R> FieldDescriptor<R> {
    /// Column name.
    pub fn column(&self) -> &'static str {
        self.column
    }

    /// Value kind of the field.
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Whether the column accepts NULL.
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// True for a database-assigned primary key, which inserts and updates
    /// leave out.
    pub fn skip_on_write(&self) -> bool {
        self.skip_on_write
    }

    /// Reads the field from `record`.
    pub fn read(&self, record: &R) -> Value {
        (self.read)(record)
    }

    /// Writes `value` into the field of `record`.
    ///
    /// # Errors
    ///
    /// `DecodeMismatch` if the value does not fit the field type.
    pub fn write(&self, record: &mut R, value: Value) -> Result<(), OrmError> {
        (self.write)(record, value).map_err(|source| OrmError::DecodeMismatch {
            column: self.column.to_string(),
            source,
        })
    }

    /// Reads the field from `record` and encodes it into a wire value.
    ///
    /// # Errors
    ///
    /// `EncodeMismatch` if the value is not valid for the field's kind.
    pub fn encode(&self, record: &R) -> Result<SqlValue, OrmError> {
        codec::encode(&self.read(record), self.kind).map_err(|source| OrmError::EncodeMismatch {
            column: self.column.to_string(),
            source,
        })
    }

    /// Decodes a wire value and writes it into the field of `record`.
    ///
    /// # Errors
    ///
    /// `DecodeMismatch` if the wire value does not fit the field.
    pub fn decode_into(&self, record: &mut R, raw: ValueRef<'_>) -> Result<(), OrmError> {
        let value = codec::decode(raw, self.kind).map_err(|source| OrmError::DecodeMismatch {
            column: self.column.to_string(),
            source,
        })?;
        self.write(record, value)
    }
}

/// Ordered mapping from column name to [`FieldDescriptor`].
pub struct FieldMap<R> {
    fields: Vec<FieldDescriptor<R>>,
}

impl<R> FieldMap<R> {
    /// Iterates fields in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldDescriptor<R>> {
        self.fields.iter()
    }

    /// Fields as a slice, in declaration order.
    pub fn as_slice(&self) -> &[FieldDescriptor<R>] {
        &self.fields
    }

    /// Looks up a field by column name, ignoring ASCII case.
    pub fn get(&self, column: &str) -> Option<&FieldDescriptor<R>> {
        self.fields
            .iter()
            .find(|f| f.column.eq_ignore_ascii_case(column))
    }

    /// Position of the field for `column`, ignoring ASCII case.
    pub fn position(&self, column: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.column.eq_ignore_ascii_case(column))
    }

    /// Column names in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.column)
    }

    /// Number of mapped fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no field is mapped.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<'a, R> IntoIterator for &'a FieldMap<R> {
    type Item = &'a FieldDescriptor<R>;
    type IntoIter = std::slice::Iter<'a, FieldDescriptor<R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Builds the field map of `R` from its declared columns.
///
/// With table metadata, the auto-increment primary key is flagged
/// `skip_on_write`; the flag is computed here once instead of at every write.
///
/// # Errors
///
/// `InvalidMetadata` if no column is declared or a column name repeats.
pub fn extract_fields<R: Record>(table: Option<&Table>) -> Result<FieldMap<R>, OrmError> {
    let columns = R::columns();
    if columns.is_empty() {
        return Err(OrmError::InvalidMetadata {
            type_name: type_name::<R>(),
            reason: "no columns declared".to_string(),
        });
    }

    let mut fields: Vec<FieldDescriptor<R>> = Vec::with_capacity(columns.len());
    for column in columns {
        if fields
            .iter()
            .any(|f| f.column.eq_ignore_ascii_case(column.name))
        {
            return Err(OrmError::InvalidMetadata {
                type_name: type_name::<R>(),
                reason: format!("column '{}' is declared twice", column.name),
            });
        }

        let skip_on_write = table
            .is_some_and(|t| t.auto_increment && t.id.eq_ignore_ascii_case(column.name));

        fields.push(FieldDescriptor {
            column: column.name,
            kind: column.kind,
            nullable: column.nullable,
            skip_on_write,
            read: column.read,
            write: column.write,
        });
    }

    Ok(FieldMap { fields })
}
