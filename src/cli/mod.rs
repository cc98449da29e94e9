//! CLI module for rowkit
//!
//! Provides command-line access to the engine:
//! - validate: Clean a persisted predicate
//! - query: Run a predicate over rows
//! - parse-action: Normalize a stored action tree
//! - operators: List operators for a column type

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{operators, parse_action, query, run, run_command, validate};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_json, write_error, write_response};
