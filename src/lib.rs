//! odataql - OData query options to SQL
//!
//! Parses `$select`, `$filter`, `$top`, `$skip`, `$orderby`, `$expand` and
//! `$count`, translates them into a backend-agnostic query description and
//! replays that description against a query builder.

pub mod builder;
pub mod cli;
pub mod grammar;
pub mod observability;
pub mod query;

pub use builder::{Dialect, QueryBuilder, SqlBuilder};
pub use query::{
    build_query_description, execute, execute_sql, explain, parse_filter, BuilderOp,
    QueryDescription, QueryError, QueryObject, QueryOptions, QueryResponse, QueryResult,
};
