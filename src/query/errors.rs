//! # Query Errors
//!
//! Every error here is fatal for the query being built: there is no
//! partial-result mode.

use thiserror::Error;

use crate::builder::BuilderError;
use crate::grammar::GrammarError;

/// Result type for filter translation
pub type TranslateResult<T> = Result<T, TranslateError>;

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Filter translation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TranslateError {
    /// Comparison node with a type that has no SQL operator
    #[error("Unknown comparison operator: {0}")]
    UnknownOperator(String),

    /// Combinator node that is neither `and` nor `or`
    #[error("Unknown logical combinator: {0}")]
    UnknownCombinator(String),

    /// Bare property or literal where a boolean expression was required
    #[error("Unexpected {0} operand, expected a comparison or logical expression")]
    UnexpectedOperand(String),
}

/// Query pipeline errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// Malformed OData input, passed through unchanged
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    Translate(#[from] TranslateError),

    #[error(transparent)]
    Builder(#[from] BuilderError),
}

impl QueryError {
    /// Stable error code for responses and logs
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::Grammar(
                GrammarError::NestingTooDeep { .. } | GrammarError::TooManyTerms { .. },
            ) => "ODATA_FILTER_TOO_COMPLEX",
            QueryError::Grammar(_) => "ODATA_SYNTAX_ERROR",
            QueryError::Translate(TranslateError::UnknownOperator(_)) => "ODATA_UNKNOWN_OPERATOR",
            QueryError::Translate(TranslateError::UnknownCombinator(_)) => {
                "ODATA_UNKNOWN_COMBINATOR"
            }
            QueryError::Translate(TranslateError::UnexpectedOperand(_)) => {
                "ODATA_UNEXPECTED_OPERAND"
            }
            QueryError::Builder(BuilderError::UnknownDialect(_)) => "ODATA_UNKNOWN_DIALECT",
            QueryError::Builder(_) => "ODATA_BUILDER_FAILED",
        }
    }
}
