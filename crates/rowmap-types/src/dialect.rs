//! Database dialect tag.

use serde::{Deserialize, Serialize};

/// SQL dialect an entity manager targets.
///
/// The dialect selects DDL column types and is handed to query objects so
/// they can emit dialect-specific SQL. Statements are executed over SQLite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    /// SQLite 3.
    #[default]
    Sqlite,
    /// PostgreSQL.
    Postgres,
}

impl DatabaseType {
    /// Returns the canonical lowercase name of this dialect.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Postgres => "postgres",
        }
    }
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DatabaseType {
    type Err = ParseDatabaseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            _ => Err(ParseDatabaseTypeError(s.to_string())),
        }
    }
}

/// Error returned when parsing an unknown dialect name.
#[derive(Debug, Clone)]
pub struct ParseDatabaseTypeError(pub String);

impl std::fmt::Display for ParseDatabaseTypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown database type: {}", self.0)
    }
}

impl std::error::Error for ParseDatabaseTypeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_names_case_insensitively() {
        assert_eq!("SQLite".parse::<DatabaseType>().ok(), Some(DatabaseType::Sqlite));
        assert_eq!("postgresql".parse::<DatabaseType>().ok(), Some(DatabaseType::Postgres));
        assert!("oracle".parse::<DatabaseType>().is_err());
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(DatabaseType::Postgres.to_string(), "postgres");
        assert_eq!(DatabaseType::default(), DatabaseType::Sqlite);
    }
}
