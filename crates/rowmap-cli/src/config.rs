//! Configuration loading from file and environment variables.

use std::time::Duration;

use rowmap_db::{PoolSettings, Storage};
use rowmap_types::DatabaseType;
use serde::Deserialize;
use thiserror::Error;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Dialect used when generating DDL.
    #[serde(default)]
    pub dialect: DatabaseType,

    /// Busy timeout for SQLite connections, in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Maximum number of pooled connections.
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,

    /// How long a command waits for a free pooled connection, in milliseconds.
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
}

impl DatabaseConfig {
    /// Storage named by `path`; `:memory:` keeps the catalog in memory.
    pub fn storage(&self) -> Storage {
        Storage::from_path(&self.path)
    }

    /// Pool tunables derived from this section.
    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            busy_timeout: Duration::from_millis(self.busy_timeout_ms),
            max_size: self.pool_max_size,
            acquire_timeout: Duration::from_millis(self.acquire_timeout_ms),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "rowmap_orm=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_db_path() -> String {
    "rowmap.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_pool_max_size() -> u32 {
    8
}

fn default_acquire_timeout_ms() -> u64 {
    30_000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            dialect: DatabaseType::default(),
            busy_timeout_ms: default_busy_timeout_ms(),
            pool_max_size: default_pool_max_size(),
            acquire_timeout_ms: default_acquire_timeout_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `ROWMAP_DB_PATH` overrides `database.path`
/// - `ROWMAP_DB_DIALECT` overrides `database.dialect` ("sqlite" or "postgres")
/// - `ROWMAP_LOG_LEVEL` overrides `logging.level`
/// - `ROWMAP_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Applies overrides read through `lookup`. Unparseable values are ignored.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(db_path) = lookup("ROWMAP_DB_PATH") {
        config.database.path = db_path;
    }
    if let Some(dialect) = lookup("ROWMAP_DB_DIALECT") {
        match dialect.parse() {
            Ok(parsed) => config.database.dialect = parsed,
            Err(e) => tracing::warn!(error = %e, "ignoring ROWMAP_DB_DIALECT"),
        }
    }
    if let Some(level) = lookup("ROWMAP_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = lookup("ROWMAP_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let path = dir.path().join("absent.toml");

        let config = load_config(Some(path.to_str().expect("utf-8 path")))
            .expect("missing file should fall back to defaults");
        assert_eq!(config.database.busy_timeout_ms, 5_000);
        assert_eq!(config.database.pool_max_size, 8);
        assert_eq!(config.database.pool_settings(), PoolSettings::default());
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let path = dir.path().join("rowmap.toml");
        std::fs::write(
            &path,
            r#"
                [database]
                path = "/var/lib/rowmap/library.db"
                dialect = "postgres"
                pool_max_size = 2

                [logging]
                json = true
            "#,
        )
        .expect("failed to write config");

        let contents = std::fs::read_to_string(&path).expect("failed to read config");
        let config: Config = toml::from_str(&contents).expect("config should parse");
        assert_eq!(config.database.path, "/var/lib/rowmap/library.db");
        assert_eq!(config.database.dialect, DatabaseType::Postgres);
        assert_eq!(config.database.pool_max_size, 2);
        assert_eq!(config.database.busy_timeout_ms, 5_000);
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn database_section_maps_to_storage_and_pool_settings() {
        let config: Config = toml::from_str(
            r#"
                [database]
                path = ":memory:"
                busy_timeout_ms = 250
                pool_max_size = 1
                acquire_timeout_ms = 1500
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.database.storage(), Storage::Memory);
        assert_eq!(
            config.database.pool_settings(),
            PoolSettings {
                busy_timeout: Duration::from_millis(250),
                max_size: 1,
                acquire_timeout: Duration::from_millis(1_500),
            }
        );
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[database\npath = ").expect("failed to write config");

        let err = load_config(Some(path.to_str().expect("utf-8 path")))
            .expect_err("malformed file should fail");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn environment_overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("ROWMAP_DB_PATH", "/tmp/override.db"),
            ("ROWMAP_DB_DIALECT", "PostgreSQL"),
            ("ROWMAP_LOG_LEVEL", "rowmap_orm=debug"),
            ("ROWMAP_LOG_JSON", "1"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        apply_env_overrides(&mut config, |key| env.get(key).map(ToString::to_string));

        assert_eq!(config.database.path, "/tmp/override.db");
        assert_eq!(config.database.dialect, DatabaseType::Postgres);
        assert_eq!(config.logging.level, "rowmap_orm=debug");
        assert!(config.logging.json);
    }

    #[test]
    fn unparseable_dialect_override_is_ignored() {
        let mut config = Config::default();
        apply_env_overrides(&mut config, |key| {
            (key == "ROWMAP_DB_DIALECT").then(|| "oracle".to_string())
        });
        assert_eq!(config.database.dialect, DatabaseType::Sqlite);
    }
}
