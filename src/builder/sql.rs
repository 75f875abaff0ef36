//! SQL-rendering query builder
//!
//! `get` and `get_count` return the rendered statement; executing it is
//! left to whoever owns the database connection.

use serde_json::Value;

use super::dialect::Dialect;
use super::errors::{BuilderError, BuilderResult};
use super::{Operator, QueryBuilder, WhereValue};
use crate::grammar::SortDirection;

const AGGREGATES: [&str; 5] = ["count", "sum", "avg", "min", "max"];

#[derive(Debug, Clone, PartialEq)]
enum Column {
    Field(String),
    Aggregate {
        function: String,
        arg: String,
        alias: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum Condition {
    Compare {
        field: String,
        operator: Operator,
        value: WhereValue,
    },
    And,
    Or,
}

/// State of the statement under construction
#[derive(Debug, Clone, Default)]
struct Statement {
    table: Option<String>,
    columns: Vec<Column>,
    conditions: Vec<Condition>,
    orders: Vec<(String, SortDirection)>,
    limit: Option<u64>,
    offset: Option<u64>,
}

/// Builder rendering SELECT statements for one dialect
#[derive(Debug, Clone, Default)]
pub struct SqlBuilder {
    dialect: Dialect,
    statement: Statement,
}

impl SqlBuilder {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            statement: Statement::default(),
        }
    }

    /// Create a builder from a dialect name (`""` selects the generic dialect)
    pub fn for_dialect(name: &str) -> BuilderResult<Self> {
        Ok(Self::new(Dialect::from_name(name)?))
    }

    fn finish(&mut self) -> BuilderResult<String> {
        let statement = std::mem::take(&mut self.statement);
        self.render(&statement)
    }

    fn render(&self, statement: &Statement) -> BuilderResult<String> {
        let table = statement.table.as_deref().ok_or(BuilderError::MissingTable)?;
        let mssql_top = self.dialect == Dialect::Mssql && statement.offset.is_none();

        let mut sql = String::from("SELECT ");
        if let (true, Some(limit)) = (mssql_top, statement.limit) {
            sql.push_str(&format!("TOP {} ", limit));
        }
        sql.push_str(&self.render_columns(&statement.columns)?);
        sql.push_str(" FROM ");
        sql.push_str(&self.identifier(table));

        if let Some(conditions) = self.render_conditions(&statement.conditions)? {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions);
        }

        if !statement.orders.is_empty() {
            let orders: Vec<String> = statement
                .orders
                .iter()
                .map(|(field, direction)| {
                    format!("{} {}", self.identifier(field), direction.as_str().to_uppercase())
                })
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&orders.join(", "));
        }

        self.render_pagination(statement, &mut sql);
        Ok(sql)
    }

    fn render_columns(&self, columns: &[Column]) -> BuilderResult<String> {
        if columns.is_empty() {
            return Ok("*".to_string());
        }

        let mut rendered = Vec::with_capacity(columns.len());
        for column in columns {
            match column {
                Column::Field(name) => rendered.push(self.identifier(name)),
                Column::Aggregate {
                    function,
                    arg,
                    alias,
                } => {
                    let function = function.to_lowercase();
                    if !AGGREGATES.contains(&function.as_str()) {
                        return Err(BuilderError::UnsupportedAggregate(function));
                    }
                    let mut column =
                        format!("{}({})", function.to_uppercase(), self.identifier(arg));
                    if !alias.is_empty() {
                        column.push_str(" AS ");
                        column.push_str(&self.dialect.quote_identifier(alias));
                    }
                    rendered.push(column);
                }
            }
        }
        Ok(rendered.join(", "))
    }

    /// Conditions must alternate comparison, join, comparison, ...
    fn render_conditions(&self, conditions: &[Condition]) -> BuilderResult<Option<String>> {
        if conditions.is_empty() {
            return Ok(None);
        }

        let mut parts = Vec::with_capacity(conditions.len());
        let mut expect_comparison = true;

        for (index, condition) in conditions.iter().enumerate() {
            match (condition, expect_comparison) {
                (
                    Condition::Compare {
                        field,
                        operator,
                        value,
                    },
                    true,
                ) => parts.push(self.comparison(field, *operator, value)),
                (Condition::And, false) => parts.push("AND".to_string()),
                (Condition::Or, false) => parts.push("OR".to_string()),
                (Condition::Compare { .. }, false) => {
                    return Err(BuilderError::MalformedCondition(format!(
                        "missing join before condition {}",
                        index
                    )))
                }
                (_, true) => {
                    return Err(BuilderError::MalformedCondition(format!(
                        "join marker at position {} has no left operand",
                        index
                    )))
                }
            }
            expect_comparison = !expect_comparison;
        }

        if expect_comparison {
            return Err(BuilderError::MalformedCondition(
                "trailing join marker".to_string(),
            ));
        }

        Ok(Some(parts.join(" ")))
    }

    fn comparison(&self, field: &str, operator: Operator, value: &WhereValue) -> String {
        let column = self.identifier(field);
        let op = match operator {
            Operator::In => "IN",
            other => other.as_str(),
        };

        match value {
            WhereValue::Raw(fragment) => format!("{} {} ({})", column, op, fragment),
            WhereValue::Literal(Value::Null) if operator == Operator::Eq => {
                format!("{} IS NULL", column)
            }
            WhereValue::Literal(literal) if operator == Operator::In => {
                format!("{} IN ({})", column, self.literal(literal))
            }
            WhereValue::Literal(literal) => format!("{} {} {}", column, op, self.literal(literal)),
        }
    }

    fn render_pagination(&self, statement: &Statement, sql: &mut String) {
        match (self.dialect, statement.limit, statement.offset) {
            (Dialect::Mssql, _, None) => {}
            (Dialect::Mssql, limit, Some(offset)) => {
                if statement.orders.is_empty() {
                    sql.push_str(" ORDER BY (SELECT NULL)");
                }
                sql.push_str(&format!(" OFFSET {} ROWS", offset));
                if let Some(limit) = limit {
                    sql.push_str(&format!(" FETCH NEXT {} ROWS ONLY", limit));
                }
            }
            (dialect, limit, offset) => {
                match (limit, offset, dialect) {
                    (Some(limit), _, _) => sql.push_str(&format!(" LIMIT {}", limit)),
                    (None, Some(_), Dialect::Mysql) => sql.push_str(" LIMIT 18446744073709551615"),
                    (None, Some(_), Dialect::Sqlite) => sql.push_str(" LIMIT -1"),
                    _ => {}
                }
                if let Some(offset) = offset {
                    sql.push_str(&format!(" OFFSET {}", offset));
                }
            }
        }
    }

    /// `*` passes through; navigation paths (`a/b`) become `a.b`
    fn identifier(&self, name: &str) -> String {
        if name == "*" {
            return name.to_string();
        }
        name.split('/')
            .map(|segment| self.dialect.quote_identifier(segment))
            .collect::<Vec<_>>()
            .join(".")
    }

    fn literal(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => self.dialect.boolean(*b).to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => self.dialect.quote_string(s),
            Value::Array(items) => items
                .iter()
                .map(|item| self.literal(item))
                .collect::<Vec<_>>()
                .join(", "),
            Value::Object(_) => self.dialect.quote_string(&value.to_string()),
        }
    }
}

impl QueryBuilder for SqlBuilder {
    type Rows = String;
    type Count = String;

    fn table(&mut self, name: &str) -> &mut Self {
        self.statement.table = Some(name.to_string());
        self
    }

    fn select(&mut self, field: &str) -> &mut Self {
        self.statement.columns.push(Column::Field(field.to_string()));
        self
    }

    fn select_aggregate(&mut self, function: &str, arg: &str, alias: &str) -> &mut Self {
        self.statement.columns.push(Column::Aggregate {
            function: function.to_string(),
            arg: arg.to_string(),
            alias: alias.to_string(),
        });
        self
    }

    fn apply_where(&mut self, field: &str, operator: Operator, value: WhereValue) -> &mut Self {
        self.statement.conditions.push(Condition::Compare {
            field: field.to_string(),
            operator,
            value,
        });
        self
    }

    fn apply_and(&mut self) -> &mut Self {
        self.statement.conditions.push(Condition::And);
        self
    }

    fn apply_or(&mut self) -> &mut Self {
        self.statement.conditions.push(Condition::Or);
        self
    }

    fn order_by(&mut self, field: &str, direction: SortDirection) -> &mut Self {
        self.statement.orders.push((field.to_string(), direction));
        self
    }

    fn limit(&mut self, n: u64) -> &mut Self {
        self.statement.limit = Some(n);
        self
    }

    fn offset(&mut self, n: u64) -> &mut Self {
        self.statement.offset = Some(n);
        self
    }

    fn to_sql(&mut self) -> BuilderResult<String> {
        self.finish()
    }

    fn get(&mut self) -> BuilderResult<String> {
        self.finish()
    }

    fn get_count(&mut self) -> BuilderResult<String> {
        self.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_select_with_conditions() {
        let mut sql = SqlBuilder::new(Dialect::Postgres);
        sql.table("users")
            .select("id")
            .select("name")
            .apply_where("age", Operator::Gt, json!(10).into())
            .apply_and()
            .apply_where("name", Operator::Eq, json!("O'Brien").into())
            .order_by("name", SortDirection::Desc)
            .limit(10)
            .offset(20);

        assert_eq!(
            sql.get().unwrap(),
            "SELECT \"id\", \"name\" FROM \"users\" WHERE \"age\" > 10 AND \"name\" = 'O''Brien' \
             ORDER BY \"name\" DESC LIMIT 10 OFFSET 20"
        );
    }

    #[test]
    fn test_builder_resets_after_get() {
        let mut sql = SqlBuilder::default();
        sql.table("users").select("id").limit(5);
        sql.get().unwrap();

        assert_eq!(sql.get().unwrap_err(), BuilderError::MissingTable);
        sql.table("orders");
        assert_eq!(sql.get().unwrap(), "SELECT * FROM \"orders\"");
    }

    #[test]
    fn test_count_projection() {
        let mut sql = SqlBuilder::new(Dialect::Mysql);
        sql.table("users")
            .select_aggregate("count", "*", "")
            .apply_where("active", Operator::Eq, json!(true).into());
        assert_eq!(
            sql.get_count().unwrap(),
            "SELECT COUNT(*) FROM `users` WHERE `active` = TRUE"
        );

        sql.table("users").select_aggregate("median", "age", "m");
        assert_eq!(
            sql.get_count().unwrap_err(),
            BuilderError::UnsupportedAggregate("median".to_string())
        );
    }

    #[test]
    fn test_raw_subquery_and_null() {
        let mut sql = SqlBuilder::default();
        sql.table("orders")
            .apply_where("id", Operator::In, WhereValue::Raw("SELECT 1".into()))
            .apply_or()
            .apply_where("deleted_at", Operator::Eq, Value::Null.into());
        assert_eq!(
            sql.to_sql().unwrap(),
            "SELECT * FROM \"orders\" WHERE \"id\" IN (SELECT 1) OR \"deleted_at\" IS NULL"
        );
    }

    #[test]
    fn test_mssql_pagination() {
        let mut sql = SqlBuilder::new(Dialect::Mssql);
        sql.table("users").limit(10);
        assert_eq!(sql.get().unwrap(), "SELECT TOP 10 * FROM [users]");

        sql.table("users").limit(10).offset(30);
        assert_eq!(
            sql.get().unwrap(),
            "SELECT * FROM [users] ORDER BY (SELECT NULL) OFFSET 30 ROWS FETCH NEXT 10 ROWS ONLY"
        );
    }

    #[test]
    fn test_offset_without_limit() {
        let mut sql = SqlBuilder::new(Dialect::Sqlite);
        sql.table("t").offset(3);
        assert_eq!(sql.get().unwrap(), "SELECT * FROM \"t\" LIMIT -1 OFFSET 3");
    }

    #[test]
    fn test_navigation_path() {
        let mut sql = SqlBuilder::default();
        sql.table("people").select("Address/City");
        assert_eq!(sql.get().unwrap(), "SELECT \"Address\".\"City\" FROM \"people\"");
    }

    #[test]
    fn test_malformed_conditions() {
        let mut sql = SqlBuilder::default();
        sql.table("t").apply_and();
        assert!(matches!(
            sql.get().unwrap_err(),
            BuilderError::MalformedCondition(_)
        ));

        sql.table("t")
            .apply_where("a", Operator::Eq, json!(1).into())
            .apply_where("b", Operator::Eq, json!(2).into());
        assert!(matches!(
            sql.get().unwrap_err(),
            BuilderError::MalformedCondition(_)
        ));

        sql.table("t")
            .apply_where("a", Operator::Eq, json!(1).into())
            .apply_or();
        assert_eq!(
            sql.get().unwrap_err(),
            BuilderError::MalformedCondition("trailing join marker".to_string())
        );
    }
}
