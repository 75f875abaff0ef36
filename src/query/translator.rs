//! # Filter Translator
//!
//! Linearizes a `$filter` tree into the ordered list of builder operations
//! that rebuilds it: left subtree, join marker, right subtree.
//!
//! Routing between comparison and combinator handling looks only at a
//! node's children. A node whose left child is a property and whose right
//! child is a literal is a comparison, whatever its own type says; anything
//! else is treated as a combinator. Upstream parsers that emit
//! `{type, left, right}` nodes rely on this.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use super::errors::{QueryResult, TranslateError, TranslateResult};
use super::values::parse_filter_tree;
use crate::builder::{Operator, QueryBuilder, WhereValue};
use crate::grammar::{Expr, NodeKind};

/// One instruction replayed against a [`QueryBuilder`]
#[derive(Debug, Clone, PartialEq)]
pub enum BuilderOp {
    /// `where(field, operator, value)`
    Where {
        field: String,
        operator: Operator,
        value: Value,
    },
    /// `andOp()`
    And,
    /// `orOp()`
    Or,
}

impl BuilderOp {
    pub fn where_(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        BuilderOp::Where {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Builder method name on the wire
    pub fn method(&self) -> &'static str {
        match self {
            BuilderOp::Where { .. } => "where",
            BuilderOp::And => "andOp",
            BuilderOp::Or => "orOp",
        }
    }

    /// Positional arguments of the builder call
    pub fn args(&self) -> Vec<Value> {
        match self {
            BuilderOp::Where {
                field,
                operator,
                value,
            } => vec![
                Value::String(field.clone()),
                Value::String(operator.as_str().to_string()),
                value.clone(),
            ],
            BuilderOp::And | BuilderOp::Or => Vec::new(),
        }
    }

    /// Replay this operation against a builder
    pub fn apply<B: QueryBuilder + ?Sized>(&self, builder: &mut B) {
        match self {
            BuilderOp::Where {
                field,
                operator,
                value,
            } => {
                builder.apply_where(field, *operator, WhereValue::Literal(value.clone()));
            }
            BuilderOp::And => {
                builder.apply_and();
            }
            BuilderOp::Or => {
                builder.apply_or();
            }
        }
    }
}

/// Serializes as `{"method": ..., "args": [...]}`; join markers carry no args
impl Serialize for BuilderOp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let args = self.args();
        let len = if args.is_empty() { 1 } else { 2 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("method", self.method())?;
        if !args.is_empty() {
            map.serialize_entry("args", &args)?;
        }
        map.end()
    }
}

/// Parse and translate a raw `$filter` value; absent or empty yields `[]`
pub fn parse_filter(raw: Option<&str>) -> QueryResult<Vec<BuilderOp>> {
    let tree = parse_filter_tree(raw)?;
    Ok(translate_filter(tree.as_ref())?)
}

/// Translate an optional filter tree; no filter yields `[]`
pub fn translate_filter(filter: Option<&Expr>) -> TranslateResult<Vec<BuilderOp>> {
    match filter {
        Some(expr) => translate(expr),
        None => Ok(Vec::new()),
    }
}

/// Translate a filter tree into builder operations.
///
/// Walks the tree with an explicit stack, so tree height is bounded by
/// memory rather than by the call stack.
pub fn translate(expr: &Expr) -> TranslateResult<Vec<BuilderOp>> {
    let mut ops = Vec::new();
    let mut pending = vec![Step::Visit(expr)];

    while let Some(step) = pending.pop() {
        match step {
            Step::Visit(node) => visit(node, &mut ops, &mut pending)?,
            Step::Join(kind) => ops.push(join_for(kind)?),
        }
    }
    Ok(ops)
}

/// Work left for the walk: a subtree, or the join marker between two
enum Step<'a> {
    Visit(&'a Expr),
    Join(NodeKind),
}

fn visit<'a>(
    node: &'a Expr,
    acc: &mut Vec<BuilderOp>,
    pending: &mut Vec<Step<'a>>,
) -> TranslateResult<()> {
    match node {
        Expr::Binary { kind, left, right } => {
            if let (Expr::Property(field), Expr::Literal(value)) = (left.as_ref(), right.as_ref()) {
                acc.push(BuilderOp::Where {
                    field: field.clone(),
                    operator: operator_for(*kind)?,
                    value: value.clone(),
                });
                return Ok(());
            }

            // Popped in reverse: left subtree, marker, right subtree
            pending.push(Step::Visit(right));
            pending.push(Step::Join(*kind));
            pending.push(Step::Visit(left));
            Ok(())
        }
        Expr::Unary { kind, .. } => Err(TranslateError::UnknownCombinator(kind.to_string())),
        Expr::Property(name) => Err(TranslateError::UnexpectedOperand(format!(
            "property '{}'",
            name
        ))),
        Expr::Literal(value) => Err(TranslateError::UnexpectedOperand(format!(
            "literal {}",
            value
        ))),
    }
}

/// Comparison node type to SQL operator
pub fn operator_for(kind: NodeKind) -> TranslateResult<Operator> {
    match kind {
        NodeKind::Eq => Ok(Operator::Eq),
        NodeKind::Lt => Ok(Operator::Lt),
        NodeKind::Le => Ok(Operator::Le),
        NodeKind::Gt => Ok(Operator::Gt),
        NodeKind::Ge => Ok(Operator::Ge),
        other => Err(TranslateError::UnknownOperator(other.to_string())),
    }
}

/// Combinator node type to join marker
pub fn join_for(kind: NodeKind) -> TranslateResult<BuilderOp> {
    match kind {
        NodeKind::And => Ok(BuilderOp::And),
        NodeKind::Or => Ok(BuilderOp::Or),
        other => Err(TranslateError::UnknownCombinator(other.to_string())),
    }
}

/// Returns true if replaying the translated operations under SQL
/// precedence (AND before OR, left to right) rebuilds the tree's grouping.
///
/// The flat sequence carries no parentheses, so grouping is lost exactly
/// when an `or` combinator sits directly under an `and` combinator, as in
/// `(a or b) and c`.
pub fn preserves_grouping(expr: &Expr) -> bool {
    let mut pending = vec![expr];

    while let Some(node) = pending.pop() {
        if let Expr::Binary { kind, left, right } = node {
            match kind {
                NodeKind::And if is_or_combinator(left) || is_or_combinator(right) => {
                    return false
                }
                NodeKind::And | NodeKind::Or => {
                    pending.push(left);
                    pending.push(right);
                }
                _ => {}
            }
        }
    }
    true
}

fn is_or_combinator(expr: &Expr) -> bool {
    match expr {
        Expr::Binary {
            kind: NodeKind::Or,
            left,
            right,
        } => !matches!(
            (left.as_ref(), right.as_ref()),
            (Expr::Property(_), Expr::Literal(_))
        ),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cmp(kind: NodeKind, field: &str, value: i64) -> Expr {
        Expr::compare(kind, field, value)
    }

    #[test]
    fn test_comparison_operators() {
        let cases = [
            (NodeKind::Eq, Operator::Eq),
            (NodeKind::Lt, Operator::Lt),
            (NodeKind::Le, Operator::Le),
            (NodeKind::Gt, Operator::Gt),
            (NodeKind::Ge, Operator::Ge),
        ];
        for (kind, operator) in cases {
            let ops = translate(&cmp(kind, "age", 3)).unwrap();
            assert_eq!(ops, vec![BuilderOp::where_("age", operator, 3)]);
        }
    }

    #[test]
    fn test_combinator_order() {
        let tree = Expr::or(
            Expr::and(cmp(NodeKind::Gt, "a", 1), cmp(NodeKind::Lt, "b", 2)),
            cmp(NodeKind::Eq, "c", 3),
        );
        assert_eq!(
            translate(&tree).unwrap(),
            vec![
                BuilderOp::where_("a", Operator::Gt, 1),
                BuilderOp::And,
                BuilderOp::where_("b", Operator::Lt, 2),
                BuilderOp::Or,
                BuilderOp::where_("c", Operator::Eq, 3),
            ]
        );
    }

    #[test]
    fn test_no_filter_yields_nothing() {
        assert!(translate_filter(None).unwrap().is_empty());
        assert!(parse_filter(None).unwrap().is_empty());
        assert!(parse_filter(Some("")).unwrap().is_empty());
    }

    #[test]
    fn test_parse_filter_example() {
        let ops = parse_filter(Some("age gt 10 and name eq 'Bob'")).unwrap();
        assert_eq!(
            serde_json::to_value(&ops).unwrap(),
            json!([
                {"method": "where", "args": ["age", ">", 10]},
                {"method": "andOp"},
                {"method": "where", "args": ["name", "=", "Bob"]}
            ])
        );
    }

    #[test]
    fn test_unknown_operator() {
        let err = translate(&cmp(NodeKind::Ne, "a", 1)).unwrap_err();
        assert_eq!(err, TranslateError::UnknownOperator("ne".to_string()));
    }

    #[test]
    fn test_not_is_unknown_combinator() {
        let err = translate(&Expr::not(cmp(NodeKind::Eq, "a", 1))).unwrap_err();
        assert_eq!(err, TranslateError::UnknownCombinator("not".to_string()));
    }

    #[test]
    fn test_combinator_with_leaf_children_is_routed_as_comparison() {
        let malformed = Expr::binary(NodeKind::And, Expr::property("a"), Expr::literal(1));
        let err = translate(&malformed).unwrap_err();
        assert_eq!(err, TranslateError::UnknownOperator("and".to_string()));
    }

    #[test]
    fn test_comparison_type_with_expression_children_is_unknown_combinator() {
        let malformed = Expr::binary(
            NodeKind::Gt,
            cmp(NodeKind::Eq, "a", 1),
            cmp(NodeKind::Eq, "b", 2),
        );
        let err = translate(&malformed).unwrap_err();
        assert_eq!(err, TranslateError::UnknownCombinator("gt".to_string()));
    }

    #[test]
    fn test_property_to_property_comparison_is_rejected() {
        let tree = Expr::binary(NodeKind::Eq, Expr::property("a"), Expr::property("b"));
        let err = translate(&tree).unwrap_err();
        assert_eq!(
            err,
            TranslateError::UnexpectedOperand("property 'a'".to_string())
        );
    }

    #[test]
    fn test_tall_trees_translate_without_recursion() {
        let mut tree = cmp(NodeKind::Eq, "a", 0);
        for i in 1..100_000 {
            tree = Expr::and(tree, cmp(NodeKind::Eq, "a", i));
        }

        let ops = translate(&tree).unwrap();
        assert_eq!(ops.len(), 2 * 100_000 - 1);
        assert_eq!(ops[0], BuilderOp::where_("a", Operator::Eq, 0));
        assert_eq!(ops[1], BuilderOp::And);
        assert!(preserves_grouping(&tree));

        // Dismantle iteratively; the default drop of a tall tree recurses
        while let Expr::Binary { left, .. } = tree {
            tree = *left;
        }
    }

    #[test]
    fn test_error_order_is_left_to_right() {
        let tree = Expr::and(
            cmp(NodeKind::Ne, "a", 1),
            Expr::not(cmp(NodeKind::Eq, "b", 2)),
        );
        assert_eq!(
            translate(&tree).unwrap_err(),
            TranslateError::UnknownOperator("ne".to_string())
        );
    }

    #[test]
    fn test_apply_replays_in_order() {
        use crate::builder::SqlBuilder;

        let ops = parse_filter(Some("a eq 1 or b eq 2")).unwrap();
        let mut sql = SqlBuilder::default();
        sql.table("t");
        for op in &ops {
            op.apply(&mut sql);
        }
        assert_eq!(
            sql.to_sql().unwrap(),
            "SELECT * FROM \"t\" WHERE \"a\" = 1 OR \"b\" = 2"
        );
    }

    #[test]
    fn test_preserves_grouping() {
        let a = || cmp(NodeKind::Eq, "a", 1);
        let b = || cmp(NodeKind::Eq, "b", 2);
        let c = || cmp(NodeKind::Eq, "c", 3);

        assert!(preserves_grouping(&a()));
        assert!(preserves_grouping(&Expr::and(Expr::and(a(), b()), c())));
        assert!(preserves_grouping(&Expr::or(a(), Expr::and(b(), c()))));
        assert!(preserves_grouping(&Expr::or(Expr::or(a(), b()), c())));
        assert!(!preserves_grouping(&Expr::and(Expr::or(a(), b()), c())));
        assert!(!preserves_grouping(&Expr::and(a(), Expr::or(b(), c()))));
    }
}
