//! CLI command implementations
//!
//! Both commands resolve configuration, read one query, and write one JSON
//! object to stdout. Query errors are reported in-band as
//! `{"status":"error",...}`; only configuration and I/O failures end the
//! process with a non-zero status.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::builder::Dialect;
use crate::observability::{log_event_with_fields, Event, Logger, Severity};
use crate::query::{
    execute_sql, explain as explain_query, QueryError, QueryObject, QueryOptions, QueryResult,
    DEFAULT_LIMIT, MAX_LIMIT, MIN_LIMIT,
};

use super::args::{Command, QueryArgs};
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_error, write_response};

/// Config file read when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "./odataql.json";

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base table (optional, default "")
    #[serde(default)]
    pub resource: String,

    /// SQL dialect (optional, default "generic")
    #[serde(default = "default_dialect")]
    pub dialect: String,

    /// Limit used when `$top` is absent (optional, default 50)
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Lowest severity written to stderr (optional, default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_dialect() -> String {
    Dialect::Generic.as_str().to_string()
}
fn default_limit() -> u32 {
    DEFAULT_LIMIT
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resource: String::new(),
            dialect: default_dialect(),
            default_limit: default_limit(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load and validate configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::Config(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load the given file, or the default file when none is given.
    ///
    /// A missing default file yields defaults; a missing explicit file is
    /// an error.
    pub fn resolve(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
                match fs::metadata(&default_path) {
                    Ok(_) => Self::load(&default_path),
                    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
                    Err(e) => Err(CliError::Config(format!(
                        "Failed to read config: {}",
                        e
                    ))),
                }
            }
        }
    }

    /// Apply command-line overrides and validate the result
    pub fn with_overrides(mut self, args: &QueryArgs) -> CliResult<Self> {
        if let Some(resource) = &args.resource {
            self.resource = resource.clone();
        }
        if let Some(dialect) = &args.dialect {
            self.dialect = dialect.clone();
        }
        if let Some(log_level) = &args.log_level {
            self.log_level = log_level.clone();
        }
        self.validate()?;
        Ok(self)
    }

    /// Validate configuration
    pub fn validate(&self) -> CliResult<()> {
        if !self.query_options().has_valid_default_limit() {
            return Err(CliError::Config(format!(
                "default_limit must be in [{}, {}], got {}",
                MIN_LIMIT, MAX_LIMIT, self.default_limit
            )));
        }

        Dialect::from_name(&self.dialect)
            .map_err(|e| CliError::Config(e.to_string()))?;

        self.severity()?;

        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> CliResult<Severity> {
        Severity::from_name(&self.log_level).ok_or_else(|| {
            CliError::Config(format!(
                "Invalid log_level: '{}'. Must be one of trace, info, warn, error.",
                self.log_level
            ))
        })
    }

    /// Per-query options for the query pipeline
    pub fn query_options(&self) -> QueryOptions {
        QueryOptions::new(self.resource.as_str())
            .with_dialect(self.dialect.as_str())
            .with_default_limit(self.default_limit)
    }
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Query(args) => query(&args),
        Command::Explain(args) => explain(&args),
    }
}

/// Translate one query and run its statements through the SQL builder
pub fn query(args: &QueryArgs) -> CliResult<()> {
    let options = prepare(args)?;
    let request = match read_query(args)? {
        Ok(request) => request,
        Err(err) => return write_query_error(&err),
    };

    write_outcome(execute_sql(&request, &options))
}

/// Build the query description and exit without running any statement
pub fn explain(args: &QueryArgs) -> CliResult<()> {
    let options = prepare(args)?;
    let request = match read_query(args)? {
        Ok(request) => request,
        Err(err) => return write_query_error(&err),
    };

    write_outcome(explain_query(&request, &options))
}

fn prepare(args: &QueryArgs) -> CliResult<QueryOptions> {
    let config = Config::resolve(args.config.as_deref())?.with_overrides(args)?;
    Logger::set_min_severity(config.severity()?);

    let default_limit = config.default_limit.to_string();
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("default_limit", default_limit.as_str()),
            ("dialect", config.dialect.as_str()),
            ("resource", config.resource.as_str()),
        ],
    );

    Ok(config.query_options())
}

/// Read the query from `--query` or stdin.
///
/// The outer result carries CLI failures, the inner one malformed query
/// strings, which are reported in-band.
fn read_query(args: &QueryArgs) -> CliResult<QueryResult<QueryObject>> {
    match &args.query {
        Some(raw) => Ok(QueryObject::from_query_string(raw).map_err(QueryError::from)),
        None => request_to_query(read_request()?).map(Ok),
    }
}

fn request_to_query(request: Value) -> CliResult<QueryObject> {
    serde_json::from_value(request)
        .map_err(|e| CliError::InvalidRequest(format!("Invalid query object: {}", e)))
}

fn write_outcome<T: Serialize>(outcome: QueryResult<T>) -> CliResult<()> {
    match outcome {
        Ok(data) => write_response(serde_json::to_value(data)?),
        Err(err) => write_query_error(&err),
    }
}

fn write_query_error(err: &QueryError) -> CliResult<()> {
    write_error(err.code(), &err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config_file(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_applies_defaults() {
        let file = config_file(r#"{"resource": "users"}"#);
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.resource, "users");
        assert_eq!(config.dialect, "generic");
        assert_eq!(config.default_limit, 50);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_load_rejects_out_of_range_limit() {
        let file = config_file(r#"{"default_limit": 501}"#);
        let err = Config::load(file.path()).unwrap_err();
        assert_eq!(err.code(), "ODATAQL_CLI_CONFIG_ERROR");
        assert!(err.to_string().contains("default_limit"));
    }

    #[test]
    fn test_load_rejects_unknown_dialect_and_level() {
        let file = config_file(r#"{"dialect": "oracle"}"#);
        assert!(Config::load(file.path()).is_err());

        let file = config_file(r#"{"log_level": "verbose"}"#);
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(Config::resolve(Some(&path)).is_err());
    }

    #[test]
    fn test_overrides_win_and_are_validated() {
        let args = QueryArgs {
            resource: Some("orders".to_string()),
            dialect: Some("postgres".to_string()),
            ..QueryArgs::default()
        };
        let config = Config::default().with_overrides(&args).unwrap();
        assert_eq!(config.resource, "orders");
        assert_eq!(
            config.query_options(),
            QueryOptions::new("orders").with_dialect("postgres")
        );

        let bad = QueryArgs {
            dialect: Some("db2".to_string()),
            ..QueryArgs::default()
        };
        assert!(Config::default().with_overrides(&bad).is_err());
    }

    #[test]
    fn test_read_query_from_query_string() {
        let args = QueryArgs {
            query: Some("$top=5&$select=id".to_string()),
            ..QueryArgs::default()
        };
        let query = read_query(&args).unwrap().unwrap();
        assert_eq!(query, QueryObject::new().with_top("5").with_select("id"));

        let args = QueryArgs {
            query: Some("$search=x".to_string()),
            ..QueryArgs::default()
        };
        let err = read_query(&args).unwrap().unwrap_err();
        assert_eq!(err.code(), "ODATA_SYNTAX_ERROR");
    }

    #[test]
    fn test_request_to_query() {
        let query = request_to_query(json!({"$top": 10, "$count": true})).unwrap();
        assert_eq!(query, QueryObject::new().with_top(10).with_count(true));

        let err = request_to_query(json!({"$filter": 3})).unwrap_err();
        assert_eq!(err.code(), "ODATAQL_CLI_INVALID_REQUEST");
    }
}
