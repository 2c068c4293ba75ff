//! Statement execution and row decoding.
//!
//! Every function here runs exactly one statement on a borrowed connection.
//! Prepared statements and cursors are locals, so they are finalized on
//! every exit path before the caller releases the connection.

use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection, Row};
use rowmap_types::Value;

use crate::codec;
use crate::error::{DataAccessError, OrmError};
use crate::mapper::{FieldDescriptor, FieldMap};
use crate::metadata::{EntityDescriptor, Record, Report, ReportDescriptor};
use crate::statement;

/// Runs a DDL statement, logging and returning any failure.
pub(crate) fn execute_ddl(conn: &Connection, table: &'static str, sql: &str) -> Result<(), OrmError> {
    tracing::debug!(table, sql, "executing DDL");

    if let Err(e) = conn.execute_batch(sql) {
        tracing::error!(table, sql, error = %e, "DDL statement failed");
        return Err(OrmError::Ddl {
            table,
            source: DataAccessError::Database(e),
        });
    }

    tracing::info!(table, "applied DDL");
    Ok(())
}

/// Inserts `entity` and writes the stored primary key back into it.
pub(crate) fn insert<E: Record>(
    conn: &Connection,
    desc: &EntityDescriptor<E>,
    entity: &mut E,
) -> Result<(), OrmError> {
    let sql = statement::insert(desc);
    let params = encode_fields(desc.insert_fields(), entity)?;
    tracing::debug!(table = desc.table_name(), sql = %sql, "executing insert");

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(params))?;
    if let Some(row) = rows.next()? {
        desc.id_field().decode_into(entity, row.get_ref(0)?)?;
    }
    Ok(())
}

/// Rewrites every writable field of the row matching `entity`'s key.
///
/// Returns whether a row matched.
pub(crate) fn update<E: Record>(
    conn: &Connection,
    desc: &EntityDescriptor<E>,
    entity: &E,
) -> Result<bool, OrmError> {
    let sql = statement::update(desc);
    let mut params = encode_fields(desc.update_fields(), entity)?;
    params.push(desc.id_field().encode(entity)?);
    tracing::debug!(table = desc.table_name(), sql = %sql, "executing update");

    let changed = conn.execute(&sql, params_from_iter(params))?;
    Ok(changed > 0)
}

/// Runs a statement whose only parameter is a primary key.
///
/// Returns the number of affected rows.
pub(crate) fn execute_by_id<E>(
    conn: &Connection,
    desc: &EntityDescriptor<E>,
    sql: &str,
    id: &Value,
) -> Result<usize, OrmError> {
    let key = encode_id(desc, id)?;
    tracing::debug!(table = desc.table_name(), sql, "executing keyed statement");
    Ok(conn.execute(sql, params_from_iter([key]))?)
}

/// Runs a parameterless statement, returning the number of affected rows.
pub(crate) fn execute<E>(
    conn: &Connection,
    desc: &EntityDescriptor<E>,
    sql: &str,
) -> Result<usize, OrmError> {
    tracing::debug!(table = desc.table_name(), sql, "executing statement");
    Ok(conn.execute(sql, [])?)
}

/// Selects the row whose primary key equals `id`.
pub(crate) fn select_by_id<E: Record>(
    conn: &Connection,
    desc: &EntityDescriptor<E>,
    id: &Value,
) -> Result<Option<E>, OrmError> {
    let sql = statement::select_by_id(desc);
    let key = encode_id(desc, id)?;
    tracing::debug!(table = desc.table_name(), sql = %sql, "executing select by id");

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter([key]))?;
    match rows.next()? {
        Some(row) => Ok(Some(decode_row(row, desc.fields())?)),
        None => Ok(None),
    }
}

/// Prepares `sql`, binds `params` positionally and decodes every row.
pub(crate) fn query<R: Record>(
    conn: &Connection,
    sql: &str,
    params: Vec<SqlValue>,
    fields: &FieldMap<R>,
) -> Result<Vec<R>, OrmError> {
    tracing::debug!(sql, params = params.len(), "executing query");

    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params_from_iter(params))?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        records.push(decode_row(row, fields)?);
    }
    Ok(records)
}

/// Binds each report parameter at its declared index and decodes every row.
pub(crate) fn report<P: Report>(
    conn: &Connection,
    desc: &ReportDescriptor<P>,
    report: &P,
) -> Result<Vec<P::Row>, OrmError> {
    tracing::debug!(sql = desc.query(), params = desc.params().len(), "executing report");

    let mut stmt = conn.prepare(desc.query())?;
    for param in desc.params() {
        // The parameter's own kind selects the wire encoding.
        let value = codec::encode(&param.read(report), param.kind()).map_err(|source| {
            OrmError::EncodeMismatch {
                column: format!("?{}", param.index()),
                source,
            }
        })?;
        stmt.raw_bind_parameter(param.index(), value)?;
    }

    let fields = desc.row().fields();
    let mut rows = stmt.raw_query();
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        records.push(decode_row(row, fields)?);
    }
    Ok(records)
}

/// Populates a fresh record from the columns of `row`, matched by name.
pub(crate) fn decode_row<R: Record>(row: &Row<'_>, fields: &FieldMap<R>) -> Result<R, OrmError> {
    let mut record = R::default();
    for field in fields {
        field.decode_into(&mut record, row.get_ref(field.column())?)?;
    }
    Ok(record)
}

fn encode_fields<'a, R: 'a>(
    fields: impl Iterator<Item = &'a FieldDescriptor<R>>,
    record: &R,
) -> Result<Vec<SqlValue>, OrmError> {
    fields.map(|f| f.encode(record)).collect()
}

fn encode_id<E>(desc: &EntityDescriptor<E>, id: &Value) -> Result<SqlValue, OrmError> {
    let field = desc.id_field();
    codec::encode(id, field.kind()).map_err(|source| OrmError::EncodeMismatch {
        column: field.column().to_string(),
        source,
    })
}
