//! # Query Assembler
//!
//! Drives a [`QueryBuilder`] through the statements of one request: the
//! data query, the optional count query and one query per expanded
//! relation. Statements run strictly one after another on the same builder.

use super::description::{build_query_description, QueryDescription};
use super::errors::{QueryError, QueryResult};
use super::input::QueryObject;
use super::options::QueryOptions;
use super::response::QueryResponse;
use super::translator::BuilderOp;
use super::values::{parse_count, parse_expand};
use crate::builder::{BuilderResult, Operator, QueryBuilder, SqlBuilder, WhereValue};
use crate::observability::{log_event_with_fields, Event};

fn apply_wheres<B: QueryBuilder>(builder: &mut B, wheres: &[BuilderOp]) {
    for op in wheres {
        op.apply(builder);
    }
}

/// Run the data query: projection, filter, ordering, then pagination.
///
/// The offset is applied only when present and non-zero.
pub fn select_data<B: QueryBuilder>(
    builder: &mut B,
    description: &QueryDescription,
) -> BuilderResult<B::Rows> {
    builder.table(&description.table);
    for field in &description.selects {
        builder.select(field);
    }
    apply_wheres(builder, &description.wheres);
    for order in &description.orderbys {
        builder.order_by(&order.field, order.direction);
    }
    builder.limit(u64::from(description.limit));
    if let Some(offset) = description.offset.filter(|offset| *offset > 0) {
        builder.offset(u64::from(offset));
    }
    builder.get()
}

/// Run `count(*)` over the filtered base table
pub fn select_count<B: QueryBuilder>(
    builder: &mut B,
    description: &QueryDescription,
) -> BuilderResult<B::Count> {
    builder
        .table(&description.table)
        .select_aggregate("count", "*", "");
    apply_wheres(builder, &description.wheres);
    builder.get_count()
}

/// Fetch the rows of `relation` referenced by the filtered base rows.
///
/// The base table is assumed to reference the relation through a column
/// named `<relation>_id`, matched against the relation's `id`. Neither
/// column is checked.
pub fn select_expand<B: QueryBuilder>(
    builder: &mut B,
    relation: &str,
    description: &QueryDescription,
) -> BuilderResult<B::Rows> {
    let id_field = format!("{}_id", relation);
    builder.select(&id_field).table(&description.table);
    apply_wheres(builder, &description.wheres);
    let subquery = builder.to_sql()?;

    builder
        .select("*")
        .table(relation)
        .apply_where("id", Operator::In, WhereValue::Raw(subquery));
    builder.get()
}

/// Execute a query: always the data query, the count query when `$count`
/// is set, and one expand query per `$expand` relation.
pub fn execute<B: QueryBuilder>(
    builder: &mut B,
    query: &QueryObject,
    options: &QueryOptions,
) -> QueryResult<QueryResponse<B::Rows, B::Count>> {
    log_event_with_fields(Event::QueryReceived, &[("resource", options.resource.as_str())]);

    let result = run(builder, query, options);
    match &result {
        Ok(_) => log_event_with_fields(
            Event::QueryExecuted,
            &[("resource", options.resource.as_str())],
        ),
        Err(err) => reject(err, options),
    }
    result
}

fn run<B: QueryBuilder>(
    builder: &mut B,
    query: &QueryObject,
    options: &QueryOptions,
) -> QueryResult<QueryResponse<B::Rows, B::Count>> {
    let has_count = parse_count(query.count.as_ref());
    let expands = parse_expand(query.expand.as_deref())?;
    let description = build_query_description(query, options)?;

    let mut response = QueryResponse::new(select_data(builder, &description)?);
    log_event_with_fields(Event::DataQueryComplete, &[("table", description.table.as_str())]);

    if has_count {
        response.count = Some(select_count(builder, &description)?);
        log_event_with_fields(Event::CountQueryComplete, &[("table", description.table.as_str())]);
    }

    for relation in &expands {
        let rows = select_expand(builder, relation, &description)?;
        response.insert_expand(relation.as_str(), rows);
        log_event_with_fields(Event::ExpandQueryComplete, &[("relation", relation.as_str())]);
    }

    Ok(response)
}

/// Build the description of a query without running anything
pub fn explain(query: &QueryObject, options: &QueryOptions) -> QueryResult<QueryDescription> {
    let result = build_query_description(query, options);
    match &result {
        Ok(description) => {
            let operations = description.wheres.len().to_string();
            log_event_with_fields(
                Event::ExplainComplete,
                &[
                    ("operations", operations.as_str()),
                    ("resource", options.resource.as_str()),
                ],
            );
        }
        Err(err) => reject(err, options),
    }
    result
}

/// Execute a query with a [`SqlBuilder`] for `options.dialect`
pub fn execute_sql(
    query: &QueryObject,
    options: &QueryOptions,
) -> QueryResult<QueryResponse<String, String>> {
    let mut builder = match SqlBuilder::for_dialect(&options.dialect) {
        Ok(builder) => builder,
        Err(err) => {
            let err = QueryError::from(err);
            reject(&err, options);
            return Err(err);
        }
    };
    execute(&mut builder, query, options)
}

fn reject(err: &QueryError, options: &QueryOptions) {
    let message = err.to_string();
    log_event_with_fields(
        Event::QueryRejected,
        &[
            ("code", err.code()),
            ("message", message.as_str()),
            ("resource", options.resource.as_str()),
        ],
    );
}
