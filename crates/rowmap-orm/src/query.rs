//! Caller-supplied queries.

use std::borrow::Cow;
use std::marker::PhantomData;

use rowmap_types::{DatabaseType, Value};

use crate::metadata::Record;

/// A parameterized statement whose rows decode into [`Query::Row`].
///
/// Rows are matched to fields by column name, so the SQL must select every
/// column the row type declares.
pub trait Query {
    /// Row type every result row decodes into.
    type Row: Record;

    /// SQL text for `dialect`, with `?1..?n` placeholders.
    fn sql(&self, dialect: DatabaseType) -> Cow<'_, str>;

    /// Positional parameter values.
    fn params(&self) -> Vec<Value>;
}

/// A fixed SQL string with positional parameters.
///
/// ```rust,ignore
/// let adults = SqlQuery::<Person>::new("SELECT * FROM person WHERE age >= ?1 ORDER BY name")
///     .bind(18);
/// let rows = manager.find_by_query(&adults)?;
/// ```
#[derive(Debug, Clone)]
pub struct SqlQuery<R> {
    sql: String,
    params: Vec<Value>,
    _row: PhantomData<fn() -> R>,
}

impl<R: Record> SqlQuery<R> {
    /// Creates a query with no parameters bound.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
            _row: PhantomData,
        }
    }

    /// Appends the next positional parameter.
    #[must_use]
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.params.push(value.into());
        self
    }
}

impl<R: Record> Query for SqlQuery<R> {
    type Row = R;

    fn sql(&self, _dialect: DatabaseType) -> Cow<'_, str> {
        Cow::Borrowed(&self.sql)
    }

    fn params(&self) -> Vec<Value> {
        self.params.clone()
    }
}
