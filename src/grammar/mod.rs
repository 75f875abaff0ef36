//! # OData Grammar
//!
//! Parses OData query options (`$filter`, `$select`, `$expand`, `$orderby`,
//! `$top`, `$skip`, `$count`) into structured values.
//!
//! Input is one or more `name=value` assignments joined by `&`. Values are
//! taken verbatim; percent-decoding is the caller's job.

mod ast;
mod errors;
mod lexer;
mod parser;
mod token;

pub use ast::{Expr, NodeKind, OrderBy, ParsedQuery, ParsedValue, SortDirection};
pub use errors::{GrammarError, GrammarResult};
pub use lexer::Lexer;
pub use parser::{parse, split_options, Parser, MAX_FILTER_TERMS, MAX_NESTING_DEPTH};
pub use token::Token;
