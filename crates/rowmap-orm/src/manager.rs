//! Entity manager: one public method per persistence operation.

use rowmap_db::ConnectionProvider;
use rowmap_types::{DatabaseType, Value};

use crate::codec;
use crate::error::OrmError;
use crate::executor;
use crate::metadata::{describe_entity, describe_record, describe_report, Record, Report};
use crate::query::Query;
use crate::statement;

/// Coordinates metadata, SQL and codec for each operation.
///
/// Metadata errors are raised before a connection is acquired. Each
/// operation then holds exactly one connection from the provider and
/// releases it before returning.
#[derive(Debug)]
pub struct EntityManager<P> {
    provider: P,
    dialect: DatabaseType,
}

impl<P: ConnectionProvider> EntityManager<P> {
    /// Creates a manager over `provider` emitting DDL for `dialect`.
    pub fn new(provider: P, dialect: DatabaseType) -> Self {
        Self { provider, dialect }
    }

    /// The connection provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// The dialect tag passed to DDL generation and query objects.
    pub fn dialect(&self) -> DatabaseType {
        self.dialect
    }

    /// Creates the table of entity `E`.
    ///
    /// # Errors
    ///
    /// Metadata errors, or `Ddl` if the statement fails (also logged).
    pub fn create_model<E: Record>(&self) -> Result<(), OrmError> {
        let desc = describe_entity::<E>()?;
        let sql = statement::create_table(&desc, self.dialect);
        let conn = self.ddl_connection(desc.table_name())?;
        executor::execute_ddl(&conn, desc.table_name(), &sql)
    }

    /// Drops the table of entity `E`.
    ///
    /// # Errors
    ///
    /// Metadata errors, or `Ddl` if the statement fails (also logged).
    pub fn delete_model<E: Record>(&self) -> Result<(), OrmError> {
        let desc = describe_entity::<E>()?;
        let sql = statement::drop_table(&desc);
        let conn = self.ddl_connection(desc.table_name())?;
        executor::execute_ddl(&conn, desc.table_name(), &sql)
    }

    fn ddl_connection(&self, table: &'static str) -> Result<P::Connection<'_>, OrmError> {
        self.provider.connection().map_err(|e| {
            tracing::error!(table, error = %e, "cannot acquire connection for DDL");
            OrmError::Ddl {
                table,
                source: e.into(),
            }
        })
    }

    /// Inserts `entity` and stores the resulting primary key in it.
    ///
    /// An auto-increment key is left to the database; a caller-supplied key
    /// is inserted as given.
    ///
    /// # Errors
    ///
    /// Metadata errors, `EncodeMismatch`, or `DataAccess`.
    pub fn add<E: Record>(&self, entity: &mut E) -> Result<(), OrmError> {
        let desc = describe_entity::<E>()?;
        let conn = self.provider.connection()?;
        executor::insert(&conn, &desc, entity)
    }

    /// Rewrites the stored row of `entity`. Returns whether a row matched.
    ///
    /// # Errors
    ///
    /// Metadata errors, `EncodeMismatch`, or `DataAccess`.
    pub fn update<E: Record>(&self, entity: &E) -> Result<bool, OrmError> {
        let desc = describe_entity::<E>()?;
        let conn = self.provider.connection()?;
        executor::update(&conn, &desc, entity)
    }

    /// Deletes the stored row of `entity`. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Metadata errors, `EncodeMismatch`, or `DataAccess`.
    pub fn remove<E: Record>(&self, entity: &E) -> Result<bool, OrmError> {
        let desc = describe_entity::<E>()?;
        let id = desc.id_field().read(entity);
        let sql = statement::delete_by_id(&desc);
        let conn = self.provider.connection()?;
        Ok(executor::execute_by_id(&conn, &desc, &sql, &id)? > 0)
    }

    /// Deletes every row of entity `E`. Returns the number removed.
    ///
    /// # Errors
    ///
    /// Metadata errors or `DataAccess`.
    pub fn remove_all<E: Record>(&self) -> Result<usize, OrmError> {
        let desc = describe_entity::<E>()?;
        let sql = statement::delete_all(&desc);
        let conn = self.provider.connection()?;
        executor::execute(&conn, &desc, &sql)
    }

    /// Loads the entity whose primary key equals `id`.
    ///
    /// # Errors
    ///
    /// Metadata errors, `EncodeMismatch` if `id` does not fit the key's
    /// kind, `DecodeMismatch`, or `DataAccess`. A missing row is `Ok(None)`.
    pub fn find_by_id<E: Record>(&self, id: impl Into<Value>) -> Result<Option<E>, OrmError> {
        let desc = describe_entity::<E>()?;
        let id = id.into();
        let conn = self.provider.connection()?;
        executor::select_by_id(&conn, &desc, &id)
    }

    /// Loads every row of entity `E`, in cursor order.
    ///
    /// # Errors
    ///
    /// Metadata errors, `DecodeMismatch`, or `DataAccess`.
    pub fn find_all<E: Record>(&self) -> Result<Vec<E>, OrmError> {
        let desc = describe_entity::<E>()?;
        let sql = statement::select_all(&desc);
        let conn = self.provider.connection()?;
        executor::query(&conn, &sql, Vec::new(), desc.fields())
    }

    /// Runs a caller-supplied query and decodes its rows.
    ///
    /// # Errors
    ///
    /// Metadata errors on the row type, `DecodeMismatch`, or `DataAccess`.
    pub fn find_by_query<Q: Query>(&self, query: &Q) -> Result<Vec<Q::Row>, OrmError> {
        let desc = describe_record::<Q::Row>()?;
        let sql = query.sql(self.dialect);
        let params = query.params().iter().map(codec::to_wire).collect();
        let conn = self.provider.connection()?;
        executor::query(&conn, &sql, params, desc.fields())
    }

    /// Runs the report template with the parameters carried by `report`.
    ///
    /// # Errors
    ///
    /// Metadata errors, `EncodeMismatch`, `DecodeMismatch`, or `DataAccess`.
    pub fn build_report<R: Report>(&self, report: &R) -> Result<Vec<R::Row>, OrmError> {
        let desc = describe_report::<R>()?;
        let conn = self.provider.connection()?;
        executor::report(&conn, &desc, report)
    }

    /// Reads the primary-key value of `entity`.
    ///
    /// # Errors
    ///
    /// Metadata errors.
    pub fn primary_key_value<E: Record>(&self, entity: &E) -> Result<Value, OrmError> {
        Ok(describe_entity::<E>()?.id_field().read(entity))
    }
}
