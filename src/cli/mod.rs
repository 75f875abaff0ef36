//! CLI module for odataql
//!
//! Provides command-line interface for:
//! - query: translate one query and run it through the SQL builder
//! - explain: print the query description only

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, QueryArgs};
pub use commands::{explain, query, run, run_command, Config, DEFAULT_CONFIG_PATH};
pub use errors::{CliError, CliResult};
pub use io::{read_request, write_error, write_response};
