//! CLI argument definitions using clap
//!
//! Commands:
//! - odataql query [--config <path>] [--query <string>]
//! - odataql explain [--config <path>] [--query <string>]

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// odataql - translate OData query options into SQL
#[derive(Parser, Debug)]
#[command(name = "odataql")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Translate a query and run its statements through the SQL builder
    Query(QueryArgs),

    /// Print the query description without running any statement
    Explain(QueryArgs),
}

/// Arguments shared by `query` and `explain`
#[derive(Args, Debug, Clone, Default)]
pub struct QueryArgs {
    /// Path to configuration file (default: ./odataql.json, optional)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Raw query string such as `$top=10&$filter=age gt 3`; stdin JSON otherwise
    #[arg(long)]
    pub query: Option<String>,

    /// Base table, overrides the config file
    #[arg(long)]
    pub resource: Option<String>,

    /// SQL dialect, overrides the config file
    #[arg(long)]
    pub dialect: Option<String>,

    /// Lowest log severity written to stderr
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
