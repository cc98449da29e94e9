//! CLI argument definitions using clap
//!
//! Commands:
//! - rowkit validate --predicate <path> [--schema <path>]
//! - rowkit query --rows <path> --columns <path> --predicate <path>
//! - rowkit parse-action --tree <path>
//! - rowkit operators --type <tag>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// rowkit - view predicates and action trees for tabular data
#[derive(Parser, Debug)]
#[command(name = "rowkit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to engine configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a persisted predicate and print the result
    Validate {
        /// Persisted predicate JSON
        #[arg(long)]
        predicate: PathBuf,

        /// Schema JSON the default predicate is derived from
        #[arg(long)]
        schema: Option<PathBuf>,
    },

    /// Apply a predicate to rows and print the view
    Query {
        /// JSON array of rows
        #[arg(long)]
        rows: PathBuf,

        /// JSON array of column definitions
        #[arg(long)]
        columns: PathBuf,

        /// Persisted predicate JSON
        #[arg(long)]
        predicate: PathBuf,
    },

    /// Parse a stored action tree and print it normalized
    ParseAction {
        /// Action tree JSON
        #[arg(long)]
        tree: PathBuf,
    },

    /// List the operators offered for a column type
    Operators {
        /// Column type tag, e.g. `number` or `option-multi`
        #[arg(long = "type")]
        type_tag: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
