//! # Query Builder
//!
//! The interface the query assembler drives, plus [`SqlBuilder`], which
//! renders SQL text for a [`Dialect`].
//!
//! A builder holds the state of one statement at a time. `to_sql`, `get`
//! and `get_count` finish the current statement and reset the builder, so a
//! single builder session can serve the data, count and expand queries of
//! one request in sequence.

mod dialect;
mod errors;
mod sql;

pub use dialect::Dialect;
pub use errors::{BuilderError, BuilderResult};
pub use sql::SqlBuilder;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::grammar::SortDirection;

/// Symbolic comparison operator of a `where` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "in")]
    In,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::In => "in",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Right-hand side of a `where` call
#[derive(Debug, Clone, PartialEq)]
pub enum WhereValue {
    /// Value rendered as a literal
    Literal(Value),
    /// SQL fragment embedded verbatim (subqueries)
    Raw(String),
}

impl From<Value> for WhereValue {
    fn from(value: Value) -> Self {
        WhereValue::Literal(value)
    }
}

/// Chained statement builder
pub trait QueryBuilder {
    /// Result of executing a row query
    type Rows;
    /// Result of executing a count query
    type Count;

    fn table(&mut self, name: &str) -> &mut Self;

    /// Add a projected field; `*` selects everything
    fn select(&mut self, field: &str) -> &mut Self;

    /// Add an aggregate projection such as `count(*)`; an empty alias means none
    fn select_aggregate(&mut self, function: &str, arg: &str, alias: &str) -> &mut Self;

    fn apply_where(&mut self, field: &str, operator: Operator, value: WhereValue) -> &mut Self;

    /// Join the previous and next `where` with AND
    fn apply_and(&mut self) -> &mut Self;

    /// Join the previous and next `where` with OR
    fn apply_or(&mut self) -> &mut Self;

    fn order_by(&mut self, field: &str, direction: SortDirection) -> &mut Self;

    fn limit(&mut self, n: u64) -> &mut Self;

    fn offset(&mut self, n: u64) -> &mut Self;

    /// Render the current statement as SQL and reset
    fn to_sql(&mut self) -> BuilderResult<String>;

    /// Execute the current statement as a row query and reset
    fn get(&mut self) -> BuilderResult<Self::Rows>;

    /// Execute the current statement as a count query and reset
    fn get_count(&mut self) -> BuilderResult<Self::Count>;
}
