//! Parsed OData structures
//!
//! Defines the values produced by the grammar for each query option.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Type tag of an expression node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Not,
}

impl NodeKind {
    /// Returns the OData spelling of this node type
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Eq => "eq",
            NodeKind::Ne => "ne",
            NodeKind::Lt => "lt",
            NodeKind::Le => "le",
            NodeKind::Gt => "gt",
            NodeKind::Ge => "ge",
            NodeKind::And => "and",
            NodeKind::Or => "or",
            NodeKind::Not => "not",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A node in a parsed `$filter` tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Reference to a property (field) of the resource
    Property(String),
    /// Literal value
    Literal(Value),
    /// Comparison or logical combinator
    Binary {
        kind: NodeKind,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Prefix operator (`not`)
    Unary { kind: NodeKind, operand: Box<Expr> },
}

impl Expr {
    pub fn property(name: impl Into<String>) -> Self {
        Expr::Property(name.into())
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn binary(kind: NodeKind, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            kind,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Property/literal comparison, the leaf shape of a filter tree
    pub fn compare(kind: NodeKind, field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::binary(kind, Expr::property(field), Expr::literal(value))
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Self::binary(NodeKind::And, left, right)
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Self::binary(NodeKind::Or, left, right)
    }

    pub fn not(operand: Expr) -> Self {
        Expr::Unary {
            kind: NodeKind::Not,
            operand: Box::new(operand),
        }
    }

    /// The node's type tag as it appears on the wire
    pub fn type_name(&self) -> &'static str {
        match self {
            Expr::Property(_) => "property",
            Expr::Literal(_) => "literal",
            Expr::Binary { kind, .. } | Expr::Unary { kind, .. } => kind.as_str(),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One `$orderby` item
///
/// Serializes as a single-key mapping `{"field": "direction"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

impl Serialize for OrderBy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.field, self.direction.as_str())?;
        map.end()
    }
}

/// Parsed value of a single query option
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedValue {
    /// `$filter`
    Filter(Expr),
    /// `$select`, `$expand`
    Fields(Vec<String>),
    /// `$orderby`
    OrderBy(Vec<OrderBy>),
    /// `$top`, `$skip`
    Integer(u64),
    /// `$count`, `$inlinecount`
    Flag(bool),
}

/// All options parsed from one query string, keyed by option name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedQuery {
    options: BTreeMap<String, ParsedValue>,
}

impl ParsedQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, option: impl Into<String>, value: ParsedValue) {
        self.options.insert(option.into(), value);
    }

    pub fn get(&self, option: &str) -> Option<&ParsedValue> {
        self.options.get(option)
    }

    /// Remove and return the value for an option
    pub fn take(&mut self, option: &str) -> Option<ParsedValue> {
        self.options.remove(option)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}
