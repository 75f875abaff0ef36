//! Observable events
//!
//! Events are explicit and typed. Each event carries its own severity so
//! call sites never pick one ad hoc.

use std::fmt;

use super::logger::Severity;

/// Observable events of query translation and execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded and validated
    ConfigLoaded,

    // Query lifecycle
    /// Query accepted for execution
    QueryReceived,
    /// All statements of a query ran
    QueryExecuted,
    /// Query failed to parse, translate or run
    QueryRejected,
    /// Description built without running anything
    ExplainComplete,

    // Translation
    /// `$filter` translated into builder operations
    FilterTranslated,
    /// Filter grouping cannot survive the flat operation list
    FilterGroupingFlattened,

    // Statements
    DataQueryComplete,
    CountQueryComplete,
    ExpandQueryComplete,
}

impl Event {
    /// Returns the event name as it appears in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::QueryReceived => "QUERY_BEGIN",
            Event::QueryExecuted => "QUERY_COMPLETE",
            Event::QueryRejected => "QUERY_REJECTED",
            Event::ExplainComplete => "EXPLAIN_COMPLETE",
            Event::FilterTranslated => "FILTER_TRANSLATED",
            Event::FilterGroupingFlattened => "FILTER_GROUPING_FLATTENED",
            Event::DataQueryComplete => "DATA_QUERY_COMPLETE",
            Event::CountQueryComplete => "COUNT_QUERY_COMPLETE",
            Event::ExpandQueryComplete => "EXPAND_QUERY_COMPLETE",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Event::FilterTranslated
            | Event::DataQueryComplete
            | Event::CountQueryComplete
            | Event::ExpandQueryComplete => Severity::Trace,
            Event::ConfigLoaded
            | Event::QueryReceived
            | Event::QueryExecuted
            | Event::ExplainComplete => Severity::Info,
            Event::FilterGroupingFlattened | Event::QueryRejected => Severity::Warn,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
