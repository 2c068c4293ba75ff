//! Command-line parsing and the catalog commands.

use rowmap_db::{ConnectionProvider, PoolError};
use rowmap_orm::{EntityManager, OrmError, SqlQuery};
use serde_json::{json, Value};
use thiserror::Error;

use crate::catalog::{sample_library, Author, Book, BooksPerYear};
use crate::config::ConfigError;

/// One-line synopsis printed with usage errors.
pub const USAGE: &str =
    "usage: rowmap [--config <path>] <init | drop | seed | list | author <id> | report <year>>";

/// Errors surfaced by the binary.
#[derive(Debug, Error)]
pub enum CliError {
    /// The command line could not be understood.
    #[error("{0}\n{usage}", usage = USAGE)]
    Usage(String),

    /// Configuration failed to load.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The connection pool could not be created.
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// A persistence operation failed.
    #[error(transparent)]
    Orm(#[from] OrmError),

    /// An inserted row came back without a key.
    #[error("{entity} was stored without a primary key")]
    MissingKey { entity: &'static str },
}

/// A catalog command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Create the catalog tables.
    Init,
    /// Drop the catalog tables.
    Drop,
    /// Insert the sample authors and books.
    Seed,
    /// Print every author and book.
    List,
    /// Print one author and their books.
    Author { id: i64 },
    /// Print the books-per-year report from `since` onwards.
    Report { since: i32 },
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Value of `--config`, if given.
    pub config_path: Option<String>,
    pub command: Command,
}

/// Parses the arguments following the program name.
///
/// # Errors
///
/// `CliError::Usage` on a missing, unknown or malformed command.
pub fn parse_args<I, S>(args: I) -> Result<Invocation, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut args = args.into_iter().map(Into::into);
    let mut config_path = None;
    let mut words = Vec::new();

    while let Some(arg) = args.next() {
        if arg == "--config" {
            let path = args
                .next()
                .filter(|p| !p.trim().is_empty())
                .ok_or_else(|| CliError::Usage("--config needs a path".to_string()))?;
            config_path = Some(path);
        } else if let Some(path) = arg.strip_prefix("--config=") {
            config_path = Some(path.to_string());
        } else {
            words.push(arg);
        }
    }

    let words: Vec<&str> = words.iter().map(String::as_str).collect();
    let command = match words.as_slice() {
        ["init"] => Command::Init,
        ["drop"] => Command::Drop,
        ["seed"] => Command::Seed,
        ["list"] => Command::List,
        ["author", id] => Command::Author {
            id: id
                .parse()
                .map_err(|_| CliError::Usage(format!("invalid author id '{id}'")))?,
        },
        ["report", year] => Command::Report {
            since: year
                .parse()
                .map_err(|_| CliError::Usage(format!("invalid year '{year}'")))?,
        },
        [] => return Err(CliError::Usage("missing command".to_string())),
        other => return Err(CliError::Usage(format!("unknown command '{}'", other.join(" ")))),
    };

    Ok(Invocation {
        config_path,
        command,
    })
}

/// Runs `command` and returns its output as JSON.
///
/// # Errors
///
/// Any `OrmError` from the entity manager.
pub fn run<P: ConnectionProvider>(
    manager: &EntityManager<P>,
    command: Command,
) -> Result<Value, CliError> {
    match command {
        Command::Init => {
            manager.create_model::<Author>()?;
            manager.create_model::<Book>()?;
            Ok(json!({ "created": ["author", "book"] }))
        }
        Command::Drop => {
            manager.delete_model::<Book>()?;
            manager.delete_model::<Author>()?;
            Ok(json!({ "dropped": ["book", "author"] }))
        }
        Command::Seed => seed(manager),
        Command::List => {
            let authors = manager.find_all::<Author>()?;
            let books = manager.find_all::<Book>()?;
            Ok(json!({ "authors": authors, "books": books }))
        }
        Command::Author { id } => {
            let Some(author) = manager.find_by_id::<Author>(id)? else {
                return Ok(Value::Null);
            };
            let books = SqlQuery::<Book>::new(
                "SELECT * FROM book WHERE author_id = ?1 ORDER BY published",
            )
            .bind(id);
            let books = manager.find_by_query(&books)?;
            Ok(json!({ "author": author, "books": books }))
        }
        Command::Report { since } => {
            let rows = manager.build_report(&BooksPerYear { since })?;
            Ok(json!(rows))
        }
    }
}

fn seed<P: ConnectionProvider>(manager: &EntityManager<P>) -> Result<Value, CliError> {
    let mut authors = 0;
    let mut books = 0;

    for (mut author, titles) in sample_library() {
        manager.add(&mut author)?;
        let author_id = author.id.ok_or(CliError::MissingKey { entity: "author" })?;
        authors += 1;

        for mut book in titles {
            book.author_id = author_id;
            manager.add(&mut book)?;
            books += 1;
        }
    }

    tracing::info!(authors, books, "seeded sample catalog");
    Ok(json!({ "authors": authors, "books": books }))
}
