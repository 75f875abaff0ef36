//! # Builder Errors

use thiserror::Error;

/// Result type for builder operations
pub type BuilderResult<T> = Result<T, BuilderError>;

/// Query builder errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuilderError {
    /// Dialect name not recognized
    #[error("Unknown SQL dialect: {0}")]
    UnknownDialect(String),

    /// Statement finished without a table
    #[error("Statement has no table")]
    MissingTable,

    /// Where clauses and join markers do not alternate
    #[error("Malformed condition sequence: {0}")]
    MalformedCondition(String),

    /// Aggregate function the renderer does not support
    #[error("Unsupported aggregate function: {0}")]
    UnsupportedAggregate(String),
}
