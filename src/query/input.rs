//! # Query Object
//!
//! Raw OData query options as received from a caller, before parsing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::grammar::{split_options, GrammarError, GrammarResult};

/// Raw query options
///
/// String options are kept verbatim. `$top` and `$skip` accept a JSON
/// string or number; `$count` accepts any JSON value and is read for
/// truthiness.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryObject {
    #[serde(rename = "$select", default, skip_serializing_if = "Option::is_none")]
    pub select: Option<String>,

    #[serde(rename = "$filter", default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    #[serde(rename = "$top", default, skip_serializing_if = "Option::is_none")]
    pub top: Option<Value>,

    #[serde(rename = "$skip", default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<Value>,

    #[serde(rename = "$orderby", default, skip_serializing_if = "Option::is_none")]
    pub orderby: Option<String>,

    #[serde(rename = "$expand", default, skip_serializing_if = "Option::is_none")]
    pub expand: Option<String>,

    #[serde(rename = "$count", default, skip_serializing_if = "Option::is_none")]
    pub count: Option<Value>,
}

impl QueryObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a raw query string such as `$top=10&$filter=age gt 3`.
    ///
    /// Only splits the string; option values are parsed later. A leading
    /// `?` is ignored and no percent-decoding is applied. `$count` becomes a
    /// boolean: `false`, `0` and the empty value are false.
    pub fn from_query_string(input: &str) -> GrammarResult<Self> {
        let mut query = Self::default();
        let input = input.strip_prefix('?').unwrap_or(input);

        for (name, value) in split_options(input)? {
            let value = value.to_string();
            match name {
                "$select" => query.select = Some(value),
                "$filter" => query.filter = Some(value),
                "$top" => query.top = Some(Value::String(value)),
                "$skip" => query.skip = Some(Value::String(value)),
                "$orderby" => query.orderby = Some(value),
                "$expand" => query.expand = Some(value),
                "$count" => {
                    let flag = !matches!(value.trim(), "" | "false" | "0");
                    query.count = Some(Value::Bool(flag));
                }
                _ => return Err(GrammarError::UnsupportedOption(name.to_string())),
            }
        }

        Ok(query)
    }

    pub fn with_select(mut self, select: impl Into<String>) -> Self {
        self.select = Some(select.into());
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_top(mut self, top: impl Into<Value>) -> Self {
        self.top = Some(top.into());
        self
    }

    pub fn with_skip(mut self, skip: impl Into<Value>) -> Self {
        self.skip = Some(skip.into());
        self
    }

    pub fn with_orderby(mut self, orderby: impl Into<String>) -> Self {
        self.orderby = Some(orderby.into());
        self
    }

    pub fn with_expand(mut self, expand: impl Into<String>) -> Self {
        self.expand = Some(expand.into());
        self
    }

    pub fn with_count(mut self, count: impl Into<Value>) -> Self {
        self.count = Some(count.into());
        self
    }
}
