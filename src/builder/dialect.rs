//! SQL dialects understood by [`SqlBuilder`](super::SqlBuilder)

use std::fmt;
use std::str::FromStr;

use super::errors::BuilderError;

/// Target SQL dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// ANSI quoting with LIMIT/OFFSET
    #[default]
    Generic,
    Postgres,
    Mysql,
    Sqlite,
    Mssql,
}

impl Dialect {
    /// Resolve a dialect name. The empty name selects `Generic`.
    pub fn from_name(name: &str) -> Result<Self, BuilderError> {
        match name.trim().to_lowercase().as_str() {
            "" | "generic" | "ansi" => Ok(Dialect::Generic),
            "pg" | "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "mysql" | "mariadb" => Ok(Dialect::Mysql),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            "mssql" | "sqlserver" => Ok(Dialect::Mssql),
            _ => Err(BuilderError::UnknownDialect(name.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Generic => "generic",
            Dialect::Postgres => "postgres",
            Dialect::Mysql => "mysql",
            Dialect::Sqlite => "sqlite",
            Dialect::Mssql => "mssql",
        }
    }

    /// Quote one identifier segment, doubling embedded closing quotes
    pub fn quote_identifier(&self, name: &str) -> String {
        match self {
            Dialect::Mysql => format!("`{}`", name.replace('`', "``")),
            Dialect::Mssql => format!("[{}]", name.replace(']', "]]")),
            _ => format!("\"{}\"", name.replace('"', "\"\"")),
        }
    }

    /// Quote a string literal
    pub fn quote_string(&self, value: &str) -> String {
        let escaped = value.replace('\'', "''");
        match self {
            // MySQL treats backslash as an escape character by default
            Dialect::Mysql => format!("'{}'", escaped.replace('\\', "\\\\")),
            _ => format!("'{}'", escaped),
        }
    }

    pub fn boolean(&self, value: bool) -> &'static str {
        match (self, value) {
            (Dialect::Mssql, true) => "1",
            (Dialect::Mssql, false) => "0",
            (_, true) => "TRUE",
            (_, false) => "FALSE",
        }
    }
}

impl FromStr for Dialect {
    type Err = BuilderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dialect::from_name(s)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
