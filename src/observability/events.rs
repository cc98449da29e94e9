//! Observable engine events
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable events in rowkit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded
    ConfigLoaded,

    // Predicate validation
    /// Persisted filter dropped (unknown operator or malformed)
    FilterDropped,
    /// Persisted sort dropped (unknown operator or malformed)
    SortDropped,
    /// Persisted field coerced to its empty default
    PredicateFieldCoerced,
    /// Unknown aggregate requested for a column
    AggregateUnknown,

    // View queries
    /// View query evaluated
    ViewQuery,

    // Action trees
    /// Action tree JSON failed to parse
    ActionTreeParseFailed,
    /// Action run started
    ActionRunBegin,
    /// Action run finished
    ActionRunComplete,
    /// Node visited
    ActionNodeStart,
    /// Node command could not be resolved
    ActionCommandUnresolved,
    /// Node command failed; result replaced by null
    ActionCommandFailed,
    /// Loop node received a non-list prior result
    ActionLoopSkipped,
    /// Filter node blocked its branch
    ActionFilterBlocked,
    /// Step budget exhausted, run aborted
    ActionBudgetExceeded,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::FilterDropped => "FILTER_DROPPED",
            Event::SortDropped => "SORT_DROPPED",
            Event::PredicateFieldCoerced => "PREDICATE_FIELD_COERCED",
            Event::AggregateUnknown => "AGGREGATE_UNKNOWN",

            Event::ViewQuery => "VIEW_QUERY",

            Event::ActionTreeParseFailed => "ACTION_TREE_PARSE_FAILED",
            Event::ActionRunBegin => "ACTION_RUN_BEGIN",
            Event::ActionRunComplete => "ACTION_RUN_COMPLETE",
            Event::ActionNodeStart => "ACTION_NODE_START",
            Event::ActionCommandUnresolved => "ACTION_COMMAND_UNRESOLVED",
            Event::ActionCommandFailed => "ACTION_COMMAND_FAILED",
            Event::ActionLoopSkipped => "ACTION_LOOP_SKIPPED",
            Event::ActionFilterBlocked => "ACTION_FILTER_BLOCKED",
            Event::ActionBudgetExceeded => "ACTION_BUDGET_EXCEEDED",
        }
    }

    /// Severity an event is logged at.
    ///
    /// Tolerated conditions are TRACE and contained command failures are
    /// ERROR. The budget abort logs at WARN.
    pub fn severity(&self) -> Severity {
        match self {
            Event::ConfigLoaded
            | Event::FilterDropped
            | Event::SortDropped
            | Event::PredicateFieldCoerced
            | Event::AggregateUnknown
            | Event::ViewQuery
            | Event::ActionTreeParseFailed
            | Event::ActionNodeStart
            | Event::ActionCommandUnresolved
            | Event::ActionFilterBlocked
            | Event::ActionLoopSkipped => Severity::Trace,
            Event::ActionRunBegin | Event::ActionRunComplete => Severity::Info,
            Event::ActionBudgetExceeded => Severity::Warn,
            Event::ActionCommandFailed => Severity::Error,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ConfigLoaded,
            Event::FilterDropped,
            Event::SortDropped,
            Event::PredicateFieldCoerced,
            Event::AggregateUnknown,
            Event::ViewQuery,
            Event::ActionTreeParseFailed,
            Event::ActionRunBegin,
            Event::ActionRunComplete,
            Event::ActionNodeStart,
            Event::ActionCommandUnresolved,
            Event::ActionCommandFailed,
            Event::ActionLoopSkipped,
            Event::ActionFilterBlocked,
            Event::ActionBudgetExceeded,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_drift_is_quiet() {
        assert_eq!(Event::FilterDropped.severity(), Severity::Trace);
        assert_eq!(Event::SortDropped.severity(), Severity::Trace);
        assert_eq!(Event::ActionCommandFailed.severity(), Severity::Error);
        assert_eq!(Event::ActionBudgetExceeded.severity(), Severity::Warn);
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::ActionRunBegin), "ACTION_RUN_BEGIN");
    }
}
