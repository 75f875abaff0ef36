//! # Query Translation
//!
//! Turns a raw OData query object into a [`QueryDescription`] and executes
//! it through a [`QueryBuilder`](crate::builder::QueryBuilder).
//!
//! Pipeline:
//!
//! 1. Value parsers normalize `$select`, `$top`, `$skip`, `$orderby`,
//!    `$expand` and `$count`, clamping pagination into range
//! 2. The filter translator linearizes the `$filter` tree into builder
//!    operations
//! 3. The assembler replays the description against a builder: data
//!    query, optional count query, one query per expanded relation
//!
//! Nothing is cached between calls. Errors from any stage abort the whole
//! query; partial responses are never returned.

mod assembler;
mod description;
mod errors;
mod input;
mod options;
mod response;
mod translator;
mod values;

pub use assembler::{execute, execute_sql, explain, select_count, select_data, select_expand};
pub use description::{build_query_description, QueryDescription};
pub use errors::{QueryError, QueryResult, TranslateError, TranslateResult};
pub use input::QueryObject;
pub use options::QueryOptions;
pub use response::QueryResponse;
pub use translator::{
    join_for, operator_for, parse_filter, preserves_grouping, translate, translate_filter,
    BuilderOp,
};
pub use values::{
    clamp, coerce_number, parse, parse_count, parse_expand, parse_filter_tree, parse_limit,
    parse_offset, parse_orderby, parse_select, DEFAULT_LIMIT, MAX_LIMIT, MIN_LIMIT, MIN_OFFSET,
};
