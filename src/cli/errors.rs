//! # CLI Errors
//!
//! Failures that stop a command before a query result can be written.
//! Query errors are not here: `query` and `explain` report those on stdout.

use std::io;

use thiserror::Error;

/// Result type for CLI commands
pub type CliResult<T> = Result<T, CliError>;

/// Command failures; `main` prints them and exits non-zero
#[derive(Debug, Error)]
pub enum CliError {
    /// Config file unreadable, malformed, or out of range after overrides
    #[error("ODATAQL_CLI_CONFIG_ERROR: {0}")]
    Config(String),

    /// Stdin was empty or not a JSON query object
    #[error("ODATAQL_CLI_INVALID_REQUEST: {0}")]
    InvalidRequest(String),

    #[error("ODATAQL_CLI_IO_ERROR: {0}")]
    Io(#[from] io::Error),

    /// Result could not be encoded for stdout
    #[error("ODATAQL_CLI_IO_ERROR: {0}")]
    Encode(#[from] serde_json::Error),
}

impl CliError {
    /// Stable code, also the prefix of the display text
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(_) => "ODATAQL_CLI_CONFIG_ERROR",
            CliError::InvalidRequest(_) => "ODATAQL_CLI_INVALID_REQUEST",
            CliError::Io(_) | CliError::Encode(_) => "ODATAQL_CLI_IO_ERROR",
        }
    }
}
