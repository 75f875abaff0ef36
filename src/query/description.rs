//! # Query Description
//!
//! Backend-agnostic record of one SQL query: table, projection, filter
//! operations, ordering and pagination.

use serde::Serialize;

use super::errors::QueryResult;
use super::input::QueryObject;
use super::options::QueryOptions;
use super::translator::{preserves_grouping, translate_filter, BuilderOp};
use super::values::{parse_filter_tree, parse_limit, parse_offset, parse_orderby, parse_select};
use crate::grammar::OrderBy;
use crate::observability::{log_event_with_fields, Event};

/// Description of one query
///
/// Invariants: `limit` is in `[1, 500]`; `offset`, when present, is in
/// `[0, 500]`; `selects` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryDescription {
    pub table: String,
    pub selects: Vec<String>,
    pub wheres: Vec<BuilderOp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    pub limit: u32,
    pub orderbys: Vec<OrderBy>,
}

impl QueryDescription {
    /// Description selecting everything from `table` with the given limit
    pub fn new(table: impl Into<String>, limit: u32) -> Self {
        Self {
            table: table.into(),
            selects: vec!["*".to_string()],
            wheres: Vec::new(),
            offset: None,
            limit,
            orderbys: Vec::new(),
        }
    }
}

/// Build the description for a query.
///
/// `offset` is present only when `$skip` was given.
pub fn build_query_description(
    query: &QueryObject,
    options: &QueryOptions,
) -> QueryResult<QueryDescription> {
    let filter = parse_filter_tree(query.filter.as_deref())?;
    let wheres = translate_filter(filter.as_ref())?;

    if let Some(tree) = &filter {
        let count = wheres.len().to_string();
        log_event_with_fields(Event::FilterTranslated, &[("operations", count.as_str())]);

        if !preserves_grouping(tree) {
            log_event_with_fields(
                Event::FilterGroupingFlattened,
                &[
                    ("filter", query.filter.as_deref().unwrap_or_default()),
                    ("resource", options.resource.as_str()),
                ],
            );
        }
    }

    Ok(QueryDescription {
        table: options.resource.clone(),
        selects: parse_select(query.select.as_deref())?,
        wheres,
        offset: query.skip.as_ref().map(|skip| parse_offset(Some(skip))),
        limit: parse_limit(query.top.as_ref(), options.default_limit),
        orderbys: parse_orderby(query.orderby.as_deref())?,
    })
}
