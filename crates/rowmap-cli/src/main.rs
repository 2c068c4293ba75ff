//! `rowmap` binary: drives the sample catalog through the entity manager.
//!
//! Loads configuration, installs structured logging, opens the storage pool
//! and runs one command, printing its result as JSON.

use std::process::ExitCode;

use rowmap_cli::config::{self, Config};
use rowmap_cli::{parse_args, run, CliError, Invocation};
use rowmap_orm::EntityManager;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "rowmap.toml";

fn resolve_config_path(invocation: &Invocation) -> (String, &'static str) {
    if let Some(path) = &invocation.config_path {
        return (path.clone(), "cli-arg");
    }

    if let Ok(path) = std::env::var("ROWMAP_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (path, "env-var");
        }
    }

    (DEFAULT_CONFIG_PATH.to_string(), "default")
}

fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    // Logs go to stderr so stdout stays valid JSON.
    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn execute(invocation: &Invocation) -> Result<serde_json::Value, CliError> {
    let (config_path, config_source) = resolve_config_path(invocation);
    let config = config::load_config(Some(&config_path))?;
    init_tracing(&config);

    tracing::info!(
        source = config_source,
        path = %config_path,
        "resolved configuration path"
    );

    let pool = rowmap_db::open_pool(&config.database.storage(), &config.database.pool_settings())?;
    let manager = EntityManager::new(pool, config.database.dialect);

    tracing::info!(
        database = %config.database.path,
        dialect = %config.database.dialect,
        command = ?invocation.command,
        "running command"
    );
    run(&manager, invocation.command)
}

fn main() -> ExitCode {
    let result = parse_args(std::env::args().skip(1)).and_then(|invocation| execute(&invocation));

    match result {
        Ok(output) => {
            println!("{output:#}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("rowmap: {e}");
            ExitCode::FAILURE
        }
    }
}
