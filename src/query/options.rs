//! Per-call query options

use serde::{Deserialize, Serialize};

use super::values::{DEFAULT_LIMIT, MAX_LIMIT, MIN_LIMIT};

/// Options passed with every query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Base table the query reads from (default: "")
    #[serde(default)]
    pub resource: String,

    /// Builder dialect name (default: "", the generic dialect)
    #[serde(default)]
    pub dialect: String,

    /// Limit used when `$top` is absent or not a number (default: 50)
    #[serde(default = "default_limit")]
    pub default_limit: u32,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            resource: String::new(),
            dialect: String::new(),
            default_limit: default_limit(),
        }
    }
}

impl QueryOptions {
    /// Options for a resource with default dialect and limit
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            ..Default::default()
        }
    }

    pub fn with_dialect(mut self, dialect: impl Into<String>) -> Self {
        self.dialect = dialect.into();
        self
    }

    pub fn with_default_limit(mut self, default_limit: u32) -> Self {
        self.default_limit = default_limit;
        self
    }

    /// Returns true if `default_limit` lies within the page bounds
    pub fn has_valid_default_limit(&self) -> bool {
        (MIN_LIMIT..=MAX_LIMIT).contains(&self.default_limit)
    }
}
