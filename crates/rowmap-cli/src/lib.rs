//! Library side of the `rowmap` binary: configuration, the sample catalog
//! and the commands that drive it through the entity manager.

pub mod catalog;
pub mod commands;
pub mod config;

pub use commands::{parse_args, run, CliError, Command, Invocation};
