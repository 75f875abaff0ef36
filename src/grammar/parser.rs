// OData parser - parses query option values into structured values

use serde_json::{Number, Value};

use super::ast::{Expr, NodeKind, OrderBy, ParsedQuery, ParsedValue, SortDirection};
use super::errors::{GrammarError, GrammarResult};
use super::lexer::{Lexer, Spanned};
use super::token::Token;

/// Parse a query string made of `name=value` assignments joined by `&`.
///
/// ```ignore
/// let parsed = parse("$top=10&$filter=age gt 10")?;
/// ```
pub fn parse(input: &str) -> GrammarResult<ParsedQuery> {
    let mut parsed = ParsedQuery::new();

    for (name, value) in split_options(input)? {
        let parsed_value = parse_option(name, value)?;
        parsed.insert(name, parsed_value);
    }

    Ok(parsed)
}

/// Split a query string into `(name, raw value)` pairs.
///
/// `&` inside a single-quoted literal does not separate options. Empty
/// segments are skipped.
pub fn split_options(input: &str) -> GrammarResult<Vec<(&str, &str)>> {
    let mut options = Vec::new();
    let mut in_string = false;
    let mut start = 0;

    for (offset, c) in input.char_indices() {
        match c {
            '\'' => in_string = !in_string,
            '&' if !in_string => {
                push_option(&input[start..offset], &mut options)?;
                start = offset + 1;
            }
            _ => {}
        }
    }
    push_option(&input[start..], &mut options)?;

    Ok(options)
}

fn push_option<'a>(segment: &'a str, options: &mut Vec<(&'a str, &'a str)>) -> GrammarResult<()> {
    if segment.trim().is_empty() {
        return Ok(());
    }
    let (name, value) = segment
        .split_once('=')
        .ok_or_else(|| GrammarError::MissingAssignment(segment.to_string()))?;
    options.push((name.trim(), value));
    Ok(())
}

fn parse_option(name: &str, value: &str) -> GrammarResult<ParsedValue> {
    let mut parser = Parser::new(value)?;
    let parsed = match name {
        "$filter" => ParsedValue::Filter(parser.parse_filter()?),
        "$select" => ParsedValue::Fields(parser.parse_select()?),
        "$expand" => ParsedValue::Fields(parser.parse_paths()?),
        "$orderby" => ParsedValue::OrderBy(parser.parse_orderby()?),
        "$top" | "$skip" => ParsedValue::Integer(parser.parse_integer(name)?),
        "$count" => ParsedValue::Flag(parser.parse_bool(name)?),
        "$inlinecount" => ParsedValue::Flag(parser.parse_inlinecount()?),
        _ => return Err(GrammarError::UnsupportedOption(name.to_string())),
    };
    Ok(parsed)
}

/// Deepest nesting of parentheses and `not` in one filter
pub const MAX_NESTING_DEPTH: usize = 128;

/// Most terms (comparisons or bare operands) in one filter
pub const MAX_FILTER_TERMS: usize = 1000;

/// Recursive-descent parser over one option value.
///
/// Precedence, lowest first: `or`, `and`, `not`, comparison.
/// Binary operators of equal precedence associate to the left.
///
/// Nesting depth and term count are bounded, so the height of any
/// parsed tree stays well inside the stack.
pub struct Parser {
    tokens: Vec<Spanned>,
    position: usize,
    depth: usize,
    terms: usize,
}

impl Parser {
    pub fn new(input: &str) -> GrammarResult<Self> {
        Ok(Parser {
            tokens: Lexer::new(input).tokenize()?,
            position: 0,
            depth: 0,
            terms: 0,
        })
    }

    /// Parse a complete `$filter` expression
    pub fn parse_filter(&mut self) -> GrammarResult<Expr> {
        let expr = self.parse_or()?;
        self.expect_end()?;
        Ok(expr)
    }

    /// Parse `*` or a comma-separated property list
    pub fn parse_select(&mut self) -> GrammarResult<Vec<String>> {
        let mut fields = Vec::new();
        loop {
            if self.current() == &Token::Star {
                self.advance();
                fields.push("*".to_string());
            } else {
                fields.push(self.parse_path()?);
            }
            if !self.consume(&Token::Comma) {
                break;
            }
        }
        self.expect_end()?;
        Ok(fields)
    }

    /// Parse a comma-separated property list
    pub fn parse_paths(&mut self) -> GrammarResult<Vec<String>> {
        let mut paths = vec![self.parse_path()?];
        while self.consume(&Token::Comma) {
            paths.push(self.parse_path()?);
        }
        self.expect_end()?;
        Ok(paths)
    }

    /// Parse comma-separated `path [asc|desc]` items
    pub fn parse_orderby(&mut self) -> GrammarResult<Vec<OrderBy>> {
        let mut items = Vec::new();
        loop {
            let field = self.parse_path()?;
            let direction = match self.current() {
                Token::Asc => {
                    self.advance();
                    SortDirection::Asc
                }
                Token::Desc => {
                    self.advance();
                    SortDirection::Desc
                }
                _ => SortDirection::Asc,
            };
            items.push(OrderBy { field, direction });
            if !self.consume(&Token::Comma) {
                break;
            }
        }
        self.expect_end()?;
        Ok(items)
    }

    /// Parse a non-negative integer
    pub fn parse_integer(&mut self, option: &str) -> GrammarResult<u64> {
        let value = match self.current().clone() {
            Token::Number(text) => text.parse::<u64>().map_err(|_| GrammarError::InvalidValue {
                option: option.to_string(),
                value: text.clone(),
            })?,
            _ => return Err(self.unexpected("non-negative integer")),
        };
        self.advance();
        self.expect_end()?;
        Ok(value)
    }

    pub fn parse_bool(&mut self, option: &str) -> GrammarResult<bool> {
        let value = match self.current() {
            Token::True => true,
            Token::False => false,
            other => {
                return Err(GrammarError::InvalidValue {
                    option: option.to_string(),
                    value: other.to_string(),
                })
            }
        };
        self.advance();
        self.expect_end()?;
        Ok(value)
    }

    /// `$inlinecount=allpages|none`, the pre-v4 spelling of `$count`
    pub fn parse_inlinecount(&mut self) -> GrammarResult<bool> {
        let value = match self.current().as_identifier() {
            Some("allpages") => true,
            Some("none") => false,
            _ => {
                return Err(GrammarError::InvalidValue {
                    option: "$inlinecount".to_string(),
                    value: self.current().to_string(),
                })
            }
        };
        self.advance();
        self.expect_end()?;
        Ok(value)
    }

    fn parse_or(&mut self) -> GrammarResult<Expr> {
        let mut left = self.parse_and()?;
        while self.consume(&Token::Or) {
            let right = self.parse_and()?;
            left = Expr::or(left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> GrammarResult<Expr> {
        let mut left = self.parse_unary()?;
        while self.consume(&Token::And) {
            let right = self.parse_unary()?;
            left = Expr::and(left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> GrammarResult<Expr> {
        if self.consume(&Token::Not) {
            self.enter()?;
            let operand = self.parse_unary();
            self.depth -= 1;
            return Ok(Expr::not(operand?));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> GrammarResult<Expr> {
        self.terms += 1;
        if self.terms > MAX_FILTER_TERMS {
            return Err(GrammarError::TooManyTerms {
                limit: MAX_FILTER_TERMS,
                position: self.offset(),
            });
        }

        let left = self.parse_primary()?;

        let kind = match self.current() {
            Token::Eq => NodeKind::Eq,
            Token::Ne => NodeKind::Ne,
            Token::Lt => NodeKind::Lt,
            Token::Le => NodeKind::Le,
            Token::Gt => NodeKind::Gt,
            Token::Ge => NodeKind::Ge,
            _ => return Ok(left),
        };
        self.advance();

        let right = self.parse_primary()?;
        Ok(Expr::binary(kind, left, right))
    }

    fn parse_primary(&mut self) -> GrammarResult<Expr> {
        let expr = match self.current().clone() {
            Token::LeftParen => {
                self.enter()?;
                self.advance();
                let inner = self.parse_or();
                self.depth -= 1;
                let inner = inner?;
                self.expect(&Token::RightParen, "')'")?;
                return Ok(inner);
            }
            Token::String(text) => Expr::Literal(Value::String(text)),
            Token::Number(text) => Expr::Literal(self.number(&text, false)?),
            Token::Minus => {
                self.advance();
                match self.current().clone() {
                    Token::Number(text) => Expr::Literal(self.number(&text, true)?),
                    _ => return Err(self.unexpected("number")),
                }
            }
            Token::True => Expr::Literal(Value::Bool(true)),
            Token::False => Expr::Literal(Value::Bool(false)),
            Token::Null => Expr::Literal(Value::Null),
            token => match token.as_identifier() {
                Some(name) => Expr::Property(name.to_string()),
                None => return Err(self.unexpected("property or literal")),
            },
        };
        self.advance();
        Ok(expr)
    }

    fn enter(&mut self) -> GrammarResult<()> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(GrammarError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
                position: self.offset(),
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn parse_path(&mut self) -> GrammarResult<String> {
        let path = match self.current().as_identifier() {
            Some(name) => name.to_string(),
            None => return Err(self.unexpected("property name")),
        };
        self.advance();
        Ok(path)
    }

    /// Integers become JSON integers when they fit `i64`, anything else a float
    fn number(&self, text: &str, negative: bool) -> GrammarResult<Value> {
        let signed = if negative {
            format!("-{}", text)
        } else {
            text.to_string()
        };

        if let Ok(n) = signed.parse::<i64>() {
            return Ok(Value::Number(n.into()));
        }

        signed
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| GrammarError::InvalidNumber {
                text: signed,
                position: self.offset(),
            })
    }

    fn current(&self) -> &Token {
        self.tokens
            .get(self.position)
            .map(|(token, _)| token)
            .unwrap_or(&Token::Eof)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.position)
            .or_else(|| self.tokens.last())
            .map(|(_, offset)| *offset)
            .unwrap_or(0)
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn consume(&mut self, token: &Token) -> bool {
        if self.current() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token, expected: &str) -> GrammarResult<()> {
        if self.consume(token) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_end(&self) -> GrammarResult<()> {
        if self.current() == &Token::Eof {
            Ok(())
        } else {
            Err(self.unexpected("end of input"))
        }
    }

    fn unexpected(&self, expected: &str) -> GrammarError {
        GrammarError::UnexpectedToken {
            expected: expected.to_string(),
            found: self.current().to_string(),
            position: self.offset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filter(input: &str) -> Expr {
        Parser::new(input).unwrap().parse_filter().unwrap()
    }

    #[test]
    fn test_parse_comparison() {
        assert_eq!(filter("age gt 10"), Expr::compare(NodeKind::Gt, "age", 10));
        assert_eq!(
            filter("name eq 'Bob'"),
            Expr::compare(NodeKind::Eq, "name", "Bob")
        );
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!(filter("a eq -5"), Expr::compare(NodeKind::Eq, "a", -5));
        assert_eq!(filter("a eq 2.5"), Expr::compare(NodeKind::Eq, "a", 2.5));
        assert_eq!(filter("a eq true"), Expr::compare(NodeKind::Eq, "a", true));
        assert_eq!(
            filter("a eq null"),
            Expr::compare(NodeKind::Eq, "a", Value::Null)
        );
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let expected = Expr::or(
            Expr::compare(NodeKind::Eq, "a", 1),
            Expr::and(
                Expr::compare(NodeKind::Eq, "b", 2),
                Expr::compare(NodeKind::Eq, "c", 3),
            ),
        );
        assert_eq!(filter("a eq 1 or b eq 2 and c eq 3"), expected);
    }

    #[test]
    fn test_chains_are_left_associative() {
        let expected = Expr::and(
            Expr::and(
                Expr::compare(NodeKind::Eq, "a", 1),
                Expr::compare(NodeKind::Eq, "b", 2),
            ),
            Expr::compare(NodeKind::Eq, "c", 3),
        );
        assert_eq!(filter("a eq 1 and b eq 2 and c eq 3"), expected);
    }

    #[test]
    fn test_parentheses_override_precedence() {
        let expected = Expr::and(
            Expr::or(
                Expr::compare(NodeKind::Eq, "a", 1),
                Expr::compare(NodeKind::Eq, "b", 2),
            ),
            Expr::compare(NodeKind::Eq, "c", 3),
        );
        assert_eq!(filter("(a eq 1 or b eq 2) and c eq 3"), expected);
    }

    #[test]
    fn test_not() {
        assert_eq!(
            filter("not a eq 1"),
            Expr::not(Expr::compare(NodeKind::Eq, "a", 1))
        );
    }

    #[test]
    fn test_filter_errors() {
        let err = Parser::new("age gt").unwrap().parse_filter().unwrap_err();
        assert!(matches!(err, GrammarError::UnexpectedToken { position: 6, .. }));

        let err = Parser::new("(a eq 1").unwrap().parse_filter().unwrap_err();
        assert!(err.to_string().contains("')'"));

        let err = Parser::new("a eq 1 b").unwrap().parse_filter().unwrap_err();
        assert!(err.to_string().contains("end of input"));
    }

    #[test]
    fn test_nesting_depth_is_bounded() {
        let nested = |depth: usize| {
            format!("{}a eq 1{}", "(".repeat(depth), ")".repeat(depth))
        };

        assert_eq!(
            filter(&nested(MAX_NESTING_DEPTH)),
            Expr::compare(NodeKind::Eq, "a", 1)
        );

        let err = Parser::new(&nested(10_000))
            .unwrap()
            .parse_filter()
            .unwrap_err();
        assert_eq!(
            err,
            GrammarError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
                position: MAX_NESTING_DEPTH,
            }
        );

        let nots = format!("{}a eq 1", "not ".repeat(10_000));
        let err = Parser::new(&nots).unwrap().parse_filter().unwrap_err();
        assert!(matches!(err, GrammarError::NestingTooDeep { .. }));
    }

    #[test]
    fn test_comparison_count_is_bounded() {
        let chain = |terms: usize| vec!["a eq 1"; terms].join(" and ");

        assert!(Parser::new(&chain(MAX_FILTER_TERMS))
            .unwrap()
            .parse_filter()
            .is_ok());

        let err = Parser::new(&chain(200_000))
            .unwrap()
            .parse_filter()
            .unwrap_err();
        assert!(matches!(
            err,
            GrammarError::TooManyTerms {
                limit: MAX_FILTER_TERMS,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_select() {
        let fields = Parser::new("id, name").unwrap().parse_select().unwrap();
        assert_eq!(fields, vec!["id", "name"]);

        let all = Parser::new("*").unwrap().parse_select().unwrap();
        assert_eq!(all, vec!["*"]);
    }

    #[test]
    fn test_parse_orderby() {
        let items = Parser::new("created desc,name asc,id")
            .unwrap()
            .parse_orderby()
            .unwrap();
        assert_eq!(
            items,
            vec![
                OrderBy::desc("created"),
                OrderBy::asc("name"),
                OrderBy::asc("id")
            ]
        );
    }

    #[test]
    fn test_full_query_string() {
        let mut parsed =
            parse("$top=10&$skip=5&$select=id,name&$filter=name eq 'A&B'&$count=true").unwrap();

        assert_eq!(parsed.take("$top"), Some(ParsedValue::Integer(10)));
        assert_eq!(parsed.take("$skip"), Some(ParsedValue::Integer(5)));
        assert_eq!(
            parsed.take("$select"),
            Some(ParsedValue::Fields(vec!["id".into(), "name".into()]))
        );
        assert_eq!(
            parsed.take("$filter"),
            Some(ParsedValue::Filter(Expr::compare(
                NodeKind::Eq,
                "name",
                json!("A&B")
            )))
        );
        assert_eq!(parsed.take("$count"), Some(ParsedValue::Flag(true)));
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_inlinecount() {
        let mut parsed = parse("$inlinecount=allpages").unwrap();
        assert_eq!(parsed.take("$inlinecount"), Some(ParsedValue::Flag(true)));
    }

    #[test]
    fn test_option_errors() {
        assert_eq!(
            parse("$search=foo").unwrap_err(),
            GrammarError::UnsupportedOption("$search".to_string())
        );
        assert_eq!(
            parse("$top").unwrap_err(),
            GrammarError::MissingAssignment("$top".to_string())
        );
        assert!(matches!(
            parse("$top=-1").unwrap_err(),
            GrammarError::UnexpectedToken { .. }
        ));
        assert!(matches!(
            parse("$top=1.5").unwrap_err(),
            GrammarError::InvalidValue { .. }
        ));
    }
}
