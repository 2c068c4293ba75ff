//! Statically declared object-relational mapping over SQLite.
//!
//! Types describe their own columns through [`Record`]; entities add table
//! metadata, reports add a fixed SQL template. From that metadata this
//! crate builds cached descriptors, generates SQL, marshals every field
//! through the value codec, and exposes the persistence operations on
//! [`EntityManager`].
//!
//! # Layers
//!
//! | Module | Responsibility |
//! |--------|---------------|
//! | `metadata` | declared metadata, descriptors, `describe_*` |
//! | `mapper` | ordered column to field mapping |
//! | `codec` | [`Value`] to SQLite wire value and back |
//! | `statement` | SQL text per operation |
//! | `executor` | binding, execution, row decoding |
//! | `manager` | one public method per operation |
//!
//! # Usage
//!
//! ```rust,ignore
//! use rowmap_orm::{DatabaseType, EntityManager};
//!
//! let storage = rowmap_db::Storage::from_path("library.db");
//! let pool = rowmap_db::open_pool(&storage, &Default::default())?;
//! let manager = EntityManager::new(pool, DatabaseType::Sqlite);
//!
//! manager.create_model::<Person>()?;
//! let mut ada = Person { id: None, name: "Ada".into(), born: date(1815, 12, 10) };
//! manager.add(&mut ada)?;
//! let stored: Option<Person> = manager.find_by_id(ada.id.unwrap_or_default())?;
//! ```

mod cache;
pub mod codec;
mod error;
mod executor;
mod manager;
mod mapper;
mod metadata;
mod query;
pub mod statement;

pub use error::{DataAccessError, OrmError};
pub use manager::EntityManager;
pub use mapper::{extract_fields, FieldDescriptor, FieldMap};
pub use metadata::{
    describe_entity, describe_record, describe_report, Column, EntityDescriptor, Record,
    RecordDescriptor, Report, ReportDef, ReportDescriptor, ReportParam, Table,
};
pub use query::{Query, SqlQuery};

pub use rowmap_types::{
    persist_enum, DatabaseType, EnumKind, FieldValue, PersistEnum, Value, ValueError, ValueKind,
};
