//! Declared metadata and the descriptors built from it.
//!
//! A type opts into mapping by implementing [`Record`], listing its columns
//! in declaration order. Adding [`Record::table`] makes it an entity; a
//! separate [`Report`] impl makes a parameter type drive a fixed SQL
//! template. The `describe_*` functions turn that metadata into immutable
//! descriptors, built once per type and cached for the life of the process.

use std::any::type_name;
use std::sync::Arc;

use rowmap_types::{FieldValue, Value, ValueError, ValueKind};

use crate::cache;
use crate::error::OrmError;
use crate::mapper::{extract_fields, FieldDescriptor, FieldMap};

pub(crate) type Reader<R> = Box<dyn Fn(&R) -> Value + Send + Sync>;
pub(crate) type Writer<R> = Box<dyn Fn(&mut R, Value) -> Result<(), ValueError> + Send + Sync>;

/// A type that can be populated from a result row.
///
/// ```rust,ignore
/// #[derive(Debug, Default)]
/// struct Person {
///     id: Option<i64>,
///     name: String,
///     born: NaiveDate,
/// }
///
/// impl Record for Person {
///     fn columns() -> Vec<Column<Self>> {
///         vec![
///             Column::new("id", |p: &Person| &p.id, |p: &mut Person| &mut p.id),
///             Column::new("name", |p: &Person| &p.name, |p: &mut Person| &mut p.name),
///             Column::new("born", |p: &Person| &p.born, |p: &mut Person| &mut p.born),
///         ]
///     }
///
///     fn table() -> Option<Table> {
///         Some(Table::new("person", "id").auto_increment())
///     }
/// }
/// ```
pub trait Record: Default + Send + Sync + 'static {
    /// Mapped columns in declaration order.
    fn columns() -> Vec<Column<Self>>;

    /// Table metadata. Records without it can be read from queries and
    /// reports but cannot be persisted.
    fn table() -> Option<Table> {
        None
    }
}

/// Table metadata of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Table {
    /// Table name.
    pub name: &'static str,
    /// Primary-key column name.
    pub id: &'static str,
    /// Whether the database assigns the primary key.
    pub auto_increment: bool,
}

impl Table {
    /// Declares a table whose primary key is supplied by the caller.
    pub const fn new(name: &'static str, id: &'static str) -> Self {
        Self {
            name,
            id,
            auto_increment: false,
        }
    }

    /// Marks the primary key as database-assigned.
    #[must_use]
    pub const fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }
}

/// A declared column: name plus a typed accessor pair.
///
/// The field's Rust type fixes the column's [`ValueKind`] and nullability
/// through [`FieldValue`].
pub struct Column<R> {
    pub(crate) name: &'static str,
    pub(crate) kind: ValueKind,
    pub(crate) nullable: bool,
    pub(crate) read: Reader<R>,
    pub(crate) write: Writer<R>,
}

impl<R: 'static> Column<R> {
    /// Declares a column backed by the field reached through `get`/`get_mut`.
    pub fn new<T: FieldValue + 'static>(
        name: &'static str,
        get: fn(&R) -> &T,
        get_mut: fn(&mut R) -> &mut T,
    ) -> Self {
        Self {
            name,
            kind: T::KIND,
            nullable: T::NULLABLE,
            read: Box::new(move |record: &R| get(record).to_value()),
            write: Box::new(move |record: &mut R, value: Value| {
                *get_mut(record) = T::from_value(value)?;
                Ok(())
            }),
        }
    }

    /// Column name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Value kind resolved from the field type.
    pub fn kind(&self) -> ValueKind {
        self.kind
    }
}

/// A parameterized read-only query with a fixed SQL template.
///
/// The implementing type carries the parameter values; [`Report::Row`] is the
/// record every result row decodes into.
pub trait Report: Sized + Send + Sync + 'static {
    /// Row type of the report.
    type Row: Record;

    /// The SQL template and its parameter bindings.
    fn definition() -> Option<ReportDef<Self>>;
}

/// Declared report: SQL template plus positional parameters.
pub struct ReportDef<P> {
    pub(crate) query: &'static str,
    pub(crate) params: Vec<ReportParam<P>>,
}

impl<P: 'static> ReportDef<P> {
    /// Starts a report over `query`, whose placeholders are `?1`, `?2`, ...
    pub fn new(query: &'static str) -> Self {
        Self {
            query,
            params: Vec::new(),
        }
    }

    /// Binds the field reached through `get` to placeholder `index` (1-based).
    #[must_use]
    pub fn param<T: FieldValue + 'static>(mut self, index: usize, get: fn(&P) -> &T) -> Self {
        self.params.push(ReportParam {
            index,
            kind: T::KIND,
            read: Box::new(move |report: &P| get(report).to_value()),
        });
        self
    }
}

/// One positional report parameter.
pub struct ReportParam<P> {
    index: usize,
    kind: ValueKind,
    read: Reader<P>,
}

impl<P> ReportParam<P> {
    /// 1-based placeholder index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Kind of the source field; binding dispatches on it.
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Reads the parameter value from a report instance.
    pub fn read(&self, report: &P) -> Value {
        (self.read)(report)
    }
}

/// Descriptor of a persistable type.
pub struct EntityDescriptor<E> {
    table: Table,
    fields: FieldMap<E>,
    id_index: usize,
}

impl<E> EntityDescriptor<E> {
    /// Table name.
    pub fn table_name(&self) -> &'static str {
        self.table.name
    }

    /// Declared table metadata.
    pub fn table(&self) -> Table {
        self.table
    }

    /// Whether the database assigns the primary key.
    pub fn auto_increment(&self) -> bool {
        self.table.auto_increment
    }

    /// All mapped fields in declaration order.
    pub fn fields(&self) -> &FieldMap<E> {
        &self.fields
    }

    /// The primary-key field.
    pub fn id_field(&self) -> &FieldDescriptor<E> {
        &self.fields.as_slice()[self.id_index]
    }

    /// Fields written by an insert, in declaration order.
    pub fn insert_fields(&self) -> impl Iterator<Item = &FieldDescriptor<E>> {
        self.fields.iter().filter(|f| !f.skip_on_write())
    }

    /// Fields written by an update's SET clause, in declaration order.
    pub fn update_fields(&self) -> impl Iterator<Item = &FieldDescriptor<E>> {
        let id_index = self.id_index;
        self.fields
            .iter()
            .enumerate()
            .filter(move |(i, f)| *i != id_index && !f.skip_on_write())
            .map(|(_, f)| f)
    }
}

/// Descriptor of a row type without table metadata.
pub struct RecordDescriptor<R> {
    fields: FieldMap<R>,
}

impl<R> RecordDescriptor<R> {
    /// All mapped fields in declaration order.
    pub fn fields(&self) -> &FieldMap<R> {
        &self.fields
    }
}

/// Descriptor of a report type.
pub struct ReportDescriptor<P: Report> {
    query: &'static str,
    params: Vec<ReportParam<P>>,
    row: Arc<RecordDescriptor<P::Row>>,
}

impl<P: Report> ReportDescriptor<P> {
    /// SQL template.
    pub fn query(&self) -> &'static str {
        self.query
    }

    /// Parameters ordered by placeholder index.
    pub fn params(&self) -> &[ReportParam<P>] {
        &self.params
    }

    /// Descriptor of the row type.
    pub fn row(&self) -> &RecordDescriptor<P::Row> {
        &self.row
    }
}

/// Returns the cached descriptor of entity `E`, building it on first use.
///
/// # Errors
///
/// `NoEntityMetadata` if `E` declares no table, `InvalidMetadata` if its
/// columns are empty or duplicated or the primary key is not a column.
pub fn describe_entity<E: Record>() -> Result<Arc<EntityDescriptor<E>>, OrmError> {
    cache::get_or_build(build_entity::<E>)
}

/// Returns the cached descriptor of row type `R`.
///
/// # Errors
///
/// `InvalidMetadata` if the columns are empty or duplicated.
pub fn describe_record<R: Record>() -> Result<Arc<RecordDescriptor<R>>, OrmError> {
    cache::get_or_build(|| {
        Ok(RecordDescriptor {
            fields: extract_fields::<R>(None)?,
        })
    })
}

/// Returns the cached descriptor of report type `P`.
///
/// # Errors
///
/// `NoReportMetadata` if `P` declares no definition, `InvalidMetadata` if a
/// parameter index is zero or repeated, or if the row type is invalid.
pub fn describe_report<P: Report>() -> Result<Arc<ReportDescriptor<P>>, OrmError> {
    cache::get_or_build(build_report::<P>)
}

fn build_entity<E: Record>() -> Result<EntityDescriptor<E>, OrmError> {
    let type_name = type_name::<E>();
    let table = E::table().ok_or(OrmError::NoEntityMetadata { type_name })?;
    let fields = extract_fields::<E>(Some(&table))?;
    let id_index = fields
        .position(table.id)
        .ok_or_else(|| OrmError::InvalidMetadata {
            type_name,
            reason: format!("primary key '{}' is not a declared column", table.id),
        })?;

    tracing::debug!(
        entity = type_name,
        table = table.name,
        columns = fields.len(),
        "built entity descriptor"
    );

    Ok(EntityDescriptor {
        table,
        fields,
        id_index,
    })
}

fn build_report<P: Report>() -> Result<ReportDescriptor<P>, OrmError> {
    let type_name = type_name::<P>();
    let def = P::definition().ok_or(OrmError::NoReportMetadata { type_name })?;

    let mut params = def.params;
    params.sort_by_key(ReportParam::index);
    for (i, param) in params.iter().enumerate() {
        if param.index == 0 {
            return Err(OrmError::InvalidMetadata {
                type_name,
                reason: "report parameter indices start at 1".to_string(),
            });
        }
        if i > 0 && params[i - 1].index == param.index {
            return Err(OrmError::InvalidMetadata {
                type_name,
                reason: format!("report parameter index {} is bound twice", param.index),
            });
        }
    }

    let row = describe_record::<P::Row>()?;

    tracing::debug!(
        report = type_name,
        params = params.len(),
        "built report descriptor"
    );

    Ok(ReportDescriptor {
        query: def.query,
        params,
        row,
    })
}
