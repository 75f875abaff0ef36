//! # Grammar Errors
//!
//! Error types for OData query-option parsing.

use thiserror::Error;

/// Result type for grammar operations
pub type GrammarResult<T> = Result<T, GrammarError>;

/// OData grammar errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GrammarError {
    /// Character that cannot start any token
    #[error("Unexpected character '{ch}' at position {position}")]
    UnexpectedChar { ch: char, position: usize },

    /// String literal without closing quote
    #[error("Unterminated string literal starting at position {0}")]
    UnterminatedString(usize),

    /// Numeric literal that does not fit any numeric type
    #[error("Invalid number '{text}' at position {position}")]
    InvalidNumber { text: String, position: usize },

    /// Parser expected something else
    #[error("Expected {expected} at position {position}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        position: usize,
    },

    /// Query option this grammar does not know
    #[error("Unsupported query option: {0}")]
    UnsupportedOption(String),

    /// Query option segment without '='
    #[error("Missing '=' in query option: {0}")]
    MissingAssignment(String),

    /// Parentheses or `not` nested past the parser's depth limit
    #[error("Filter nested deeper than {limit} levels at position {position}")]
    NestingTooDeep { limit: usize, position: usize },

    /// Filter with more terms than the parser accepts
    #[error("Filter has more than {limit} terms at position {position}")]
    TooManyTerms { limit: usize, position: usize },

    /// Well-formed token with an invalid value for the option
    #[error("Invalid value for {option}: {value}")]
    InvalidValue { option: String, value: String },
}
