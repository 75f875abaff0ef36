// OData tokens for lexical analysis

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Identifier(String),
    Number(String),
    String(String),

    // Logical operators
    And,
    Or,
    Not,

    // Comparison operators
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    // Keywords
    True,
    False,
    Null,
    Asc,
    Desc,

    // Punctuation
    LeftParen,
    RightParen,
    Comma,
    Star,
    Minus,

    Eof,
}

impl Token {
    /// Look up a reserved word. OData operators are case-sensitive.
    pub fn keyword(word: &str) -> Option<Token> {
        let token = match word {
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            "eq" => Token::Eq,
            "ne" => Token::Ne,
            "lt" => Token::Lt,
            "le" => Token::Le,
            "gt" => Token::Gt,
            "ge" => Token::Ge,
            "true" => Token::True,
            "false" => Token::False,
            "null" => Token::Null,
            "asc" => Token::Asc,
            "desc" => Token::Desc,
            _ => return None,
        };
        Some(token)
    }

    /// Text of a token usable as a property name.
    ///
    /// Reserved words are accepted so that a field called `desc` or `not`
    /// can still be selected.
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Token::Identifier(name) => Some(name),
            Token::And => Some("and"),
            Token::Or => Some("or"),
            Token::Not => Some("not"),
            Token::Eq => Some("eq"),
            Token::Ne => Some("ne"),
            Token::Lt => Some("lt"),
            Token::Le => Some("le"),
            Token::Gt => Some("gt"),
            Token::Ge => Some("ge"),
            Token::True => Some("true"),
            Token::False => Some("false"),
            Token::Null => Some("null"),
            Token::Asc => Some("asc"),
            Token::Desc => Some("desc"),
            _ => None,
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Token::Eq | Token::Ne | Token::Lt | Token::Le | Token::Gt | Token::Ge
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Identifier(name) => write!(f, "identifier '{}'", name),
            Token::Number(text) => write!(f, "number {}", text),
            Token::String(text) => write!(f, "string '{}'", text),
            Token::LeftParen => write!(f, "'('"),
            Token::RightParen => write!(f, "')'"),
            Token::Comma => write!(f, "','"),
            Token::Star => write!(f, "'*'"),
            Token::Minus => write!(f, "'-'"),
            Token::Eof => write!(f, "end of input"),
            keyword => write!(f, "'{}'", keyword.as_identifier().unwrap_or("?")),
        }
    }
}
