//! ObservationScope for automatic begin/complete logging
//!
//! - Logs `{name}_BEGIN` on creation
//! - Logs `{name}_COMPLETE` on completion
//! - Logs `{name}_INCOMPLETE` on drop without completion

use std::cell::Cell;

use super::events::Event;
use super::logger::{Logger, Severity};

/// A scope that automatically logs begin and complete events
///
/// # Usage
///
/// ```ignore
/// let scope = ObservationScope::new("ACTION_RUN");
/// // ... do work ...
/// scope.complete(); // logs ACTION_RUN_COMPLETE
/// ```
pub struct ObservationScope<'a> {
    name: &'a str,
    severity: Severity,
    completed: Cell<bool>,
    fields: Vec<(&'a str, String)>,
}

impl<'a> ObservationScope<'a> {
    /// Create a new observation scope logging at INFO
    ///
    /// Logs `{name}_BEGIN` immediately.
    pub fn new(name: &'a str) -> Self {
        Self::with_fields(name, Severity::Info, &[])
    }

    /// Create a scope at the given severity with fields repeated on completion
    pub fn with_fields(name: &'a str, severity: Severity, fields: &[(&'a str, &str)]) -> Self {
        let event = format!("{}_BEGIN", name);
        Logger::log(severity, &event, fields);

        Self {
            name,
            severity,
            completed: Cell::new(false),
            fields: fields.iter().map(|(k, v)| (*k, v.to_string())).collect(),
        }
    }

    /// Mark the scope as successfully completed
    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    /// Mark the scope as successfully completed with additional fields
    pub fn complete_with_fields(self, extra_fields: &[(&str, &str)]) {
        self.completed.set(true);
        let event = format!("{}_COMPLETE", self.name);

        let mut all_fields: Vec<(&str, &str)> = self
            .fields
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .collect();
        all_fields.extend(extra_fields.iter().copied());

        Logger::log(self.severity, &event, &all_fields);
    }

    /// End the scope with a catalogued event instead of `_COMPLETE`
    pub fn abort(self, event: Event, fields: &[(&str, &str)]) {
        self.completed.set(true);
        let mut all_fields: Vec<(&str, &str)> = self
            .fields
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .collect();
        all_fields.extend(fields.iter().copied());
        Logger::log(event.severity(), event.as_str(), &all_fields);
    }

    /// Check if the scope has been completed
    pub fn is_completed(&self) -> bool {
        self.completed.get()
    }
}

impl Drop for ObservationScope<'_> {
    fn drop(&mut self) {
        if !self.completed.get() {
            let event = format!("{}_INCOMPLETE", self.name);
            Logger::log(Severity::Warn, &event, &[("reason", "scope dropped without completion")]);
        }
    }
}

/// A simple duration timer for logging elapsed time
pub struct Timer {
    start: std::time::Instant,
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }

    /// Get elapsed microseconds as a string
    pub fn elapsed_us(&self) -> String {
        self.start.elapsed().as_micros().to_string()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_creation() {
        let scope = ObservationScope::new("TEST");
        assert!(!scope.is_completed());
        scope.complete();
    }

    #[test]
    fn test_scope_with_fields() {
        let scope = ObservationScope::with_fields("TEST", Severity::Trace, &[("key", "value")]);
        scope.complete_with_fields(&[("result", "success")]);
    }

    #[test]
    fn test_scope_abort() {
        let scope = ObservationScope::new("TEST");
        scope.abort(Event::ActionBudgetExceeded, &[("iterations", "11")]);
    }

    #[test]
    fn test_scope_drop_without_complete() {
        // Logs a warning but does not panic
        let scope = ObservationScope::new("TEST");
        drop(scope);
    }

    #[test]
    fn test_timer() {
        let timer = Timer::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let elapsed: u128 = timer.elapsed_us().parse().unwrap();
        assert!(elapsed >= 2000);
    }
}
