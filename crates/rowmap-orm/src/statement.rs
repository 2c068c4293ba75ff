//! SQL text for entity operations.
//!
//! Every builder is a pure function of a descriptor. Placeholders are
//! numbered `?1..?n` in the order the executor binds them: the insert or
//! update field order of the descriptor, then the primary key.

use rowmap_types::{DatabaseType, ValueKind};

use crate::mapper::FieldDescriptor;
use crate::metadata::EntityDescriptor;

/// Column type used in `CREATE TABLE` for a field of `kind`.
///
/// SQLite stores decimals as TEXT: a DECIMAL column has NUMERIC affinity and
/// would coerce the digits to a floating point REAL.
pub fn sql_type(kind: ValueKind, dialect: DatabaseType, auto_id: bool) -> &'static str {
    match (dialect, kind) {
        (DatabaseType::Sqlite, ValueKind::Integer) => "INTEGER",
        (DatabaseType::Postgres, ValueKind::Integer) if auto_id => "BIGSERIAL",
        (DatabaseType::Postgres, ValueKind::Integer) => "BIGINT",
        (DatabaseType::Sqlite, ValueKind::Float) => "REAL",
        (DatabaseType::Postgres, ValueKind::Float) => "DOUBLE PRECISION",
        (_, ValueKind::Text) => "TEXT",
        (_, ValueKind::Boolean) => "BOOLEAN",
        (_, ValueKind::DateTime) => "TIMESTAMP",
        (_, ValueKind::DateOnly) => "DATE",
        (DatabaseType::Sqlite, ValueKind::Decimal) => "TEXT",
        (DatabaseType::Postgres, ValueKind::Decimal) => "DECIMAL",
        (_, ValueKind::Enum(_)) => "VARCHAR(64)",
    }
}

/// `CREATE TABLE <table> (<col> <type> [NOT NULL], ..., PRIMARY KEY(<id>))`
pub fn create_table<E>(desc: &EntityDescriptor<E>, dialect: DatabaseType) -> String {
    let mut defs: Vec<String> = desc
        .fields()
        .iter()
        .map(|f| {
            let mut def = format!(
                "{} {}",
                f.column(),
                sql_type(f.kind(), dialect, f.skip_on_write())
            );
            if !f.is_nullable() {
                def.push_str(" NOT NULL");
            }
            def
        })
        .collect();
    defs.push(format!("PRIMARY KEY({})", desc.id_field().column()));

    format!("CREATE TABLE {} ({})", desc.table_name(), defs.join(", "))
}

/// `DROP TABLE <table>`
pub fn drop_table<E>(desc: &EntityDescriptor<E>) -> String {
    format!("DROP TABLE {}", desc.table_name())
}

/// Insert of every writable field, returning the stored primary key.
pub fn insert<E>(desc: &EntityDescriptor<E>) -> String {
    let columns: Vec<&str> = desc.insert_fields().map(FieldDescriptor::column).collect();
    let id = desc.id_field().column();

    if columns.is_empty() {
        return format!(
            "INSERT INTO {} DEFAULT VALUES RETURNING {id}",
            desc.table_name()
        );
    }

    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {id}",
        desc.table_name(),
        columns.join(", "),
        placeholders(columns.len())
    )
}

/// Update of every writable non-key field of the row matching the key.
pub fn update<E>(desc: &EntityDescriptor<E>) -> String {
    let id = desc.id_field().column();
    let sets: Vec<String> = desc
        .update_fields()
        .enumerate()
        .map(|(i, f)| format!("{} = ?{}", f.column(), i + 1))
        .collect();

    if sets.is_empty() {
        return format!(
            "UPDATE {} SET {id} = {id} WHERE {id} = ?1",
            desc.table_name()
        );
    }

    format!(
        "UPDATE {} SET {} WHERE {id} = ?{}",
        desc.table_name(),
        sets.join(", "),
        sets.len() + 1
    )
}

/// `DELETE FROM <table> WHERE <id> = ?1`
pub fn delete_by_id<E>(desc: &EntityDescriptor<E>) -> String {
    format!(
        "DELETE FROM {} WHERE {} = ?1",
        desc.table_name(),
        desc.id_field().column()
    )
}

/// `DELETE FROM <table>`
pub fn delete_all<E>(desc: &EntityDescriptor<E>) -> String {
    format!("DELETE FROM {}", desc.table_name())
}

/// `SELECT * FROM <table>`
pub fn select_all<E>(desc: &EntityDescriptor<E>) -> String {
    format!("SELECT * FROM {}", desc.table_name())
}

/// `SELECT * FROM <table> WHERE <id> = ?1`
pub fn select_by_id<E>(desc: &EntityDescriptor<E>) -> String {
    format!(
        "SELECT * FROM {} WHERE {} = ?1",
        desc.table_name(),
        desc.id_field().column()
    )
}

fn placeholders(count: usize) -> String {
    (1..=count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}
